//! `beads run`: an interactive session in the current terminal.

#![allow(missing_docs)]

use rand::Rng;

use super::format_session_summary;
use crate::core::config::Config;
use crate::core::errors::Result;
use crate::design::bank::SequenceBank;
use crate::logger::JsonlLogger;
use crate::present::AbortToken;
use crate::session::{Session, SubjectId, run_session, signals};
use crate::tui::{AccessibilityProfile, TerminalPresenter};

/// Run one participant session end to end.
///
/// Returns `Ok` for both completed and aborted sessions; the summary on
/// stdout says which. A terminal failure mid-session aborts it, flushes the
/// committed results, and is then reported as the error.
pub fn execute(config: &Config, subject: Option<&str>) -> Result<()> {
    let token = AbortToken::new();
    signals::install(&token)?;

    // Reject a bad --subject before the terminal is taken over.
    let given = subject.map(SubjectId::parse).transpose()?;
    let layout_seed = config.design.seed.unwrap_or_else(|| rand::rng().random());

    let mut presenter =
        TerminalPresenter::open(token, AccessibilityProfile::from_environment(), layout_seed)?;
    let subject = match given {
        Some(subject) => subject,
        None => {
            let prompted =
                presenter.prompt_subject(|raw| SubjectId::parse(raw).map_err(|e| e.to_string()));
            let failure = presenter.take_failure();
            match (prompted, failure) {
                (Ok(subject), _) => subject,
                (Err(_), Some(err)) => return Err(err),
                (Err(_), None) => {
                    drop(presenter);
                    println!("Cancelled before a subject was entered; nothing was written.");
                    return Ok(());
                }
            }
        }
    };

    let mut session = Session::new(subject, &config.design, &SequenceBank::reference())?;
    let mut logger = JsonlLogger::open(&config.paths.event_log_path(session.subject().as_str()));
    let outcome = run_session(&mut session, &mut presenter, &mut logger, config);
    let failure = presenter.take_failure();
    // Restore the terminal before printing anything.
    drop(presenter);

    let report = outcome?;
    print!("{}", format_session_summary(&report));
    if !logger.is_healthy() {
        eprintln!("event log unavailable at {}", logger.path().display());
    }
    failure.map_or(Ok(()), Err)
}
