//! Terminal presenter for running the task with a participant.
//!
//! Elm-style split: [`model`] holds screen state, [`update`] is the pure
//! transition function, [`render`] turns the model into a frame, and
//! [`runtime`] owns the terminal and implements the core presentation
//! contract on top of the other three.

#![allow(missing_docs)]

pub mod input;
pub mod layout;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;
pub mod update;
pub mod widgets;

pub use runtime::TerminalPresenter;
pub use theme::AccessibilityProfile;
