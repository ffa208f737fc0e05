//! Terminal event routing into the model's message stream.

#![allow(missing_docs)]

use crossterm::event::{Event, KeyEventKind};

use super::model::BeadsMsg;

/// Translate a crossterm event. Key releases and repeats are dropped so a
/// held key cannot commit twice.
#[must_use]
pub fn map_event(event: Event) -> Option<BeadsMsg> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(BeadsMsg::Key(key)),
        Event::Resize(cols, rows) => Some(BeadsMsg::Resize { cols, rows }),
        _ => None,
    }
}
