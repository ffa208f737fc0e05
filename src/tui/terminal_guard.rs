//! RAII terminal lifecycle for the participant screen.
//!
//! [`TerminalGuard`] switches to raw mode, the alternate screen and a hidden
//! cursor, and puts all three back on [`Drop`]. A panic hook restores the
//! terminal before the panic message prints so crash output stays readable
//! on a normal screen.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

use crate::core::errors::{BeadsError, Result};

/// Set while raw mode is on. The panic hook and `Drop` both consult it so
/// restoration runs exactly once.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Fallback when the terminal cannot report its size.
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Holds the terminal in participant mode for its lifetime.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enter raw mode, the alternate screen, and hide the cursor.
    ///
    /// # Errors
    /// Returns `BDS-3003` when raw mode or the alternate screen cannot be
    /// entered. Anything already switched on is switched back off first.
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode().map_err(terminal_error)?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            restore_terminal_best_effort();
            return Err(terminal_error(err));
        }

        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));

        Ok(Self { _private: () })
    }

    /// Terminal dimensions (columns, rows), or [`FALLBACK_SIZE`].
    #[must_use]
    pub fn terminal_size() -> (u16, u16) {
        terminal::size().unwrap_or(FALLBACK_SIZE)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        // The previous hook lives inside ours; fall back to the default.
        let _ = panic::take_hook();
    }
}

fn terminal_error(err: io::Error) -> BeadsError {
    BeadsError::Terminal {
        details: err.to_string(),
    }
}

fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_is_idempotent_and_clears_flag() {
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        restore_terminal_best_effort();
        restore_terminal_best_effort();
        assert!(!RAW_MODE_ACTIVE.load(Ordering::SeqCst));
    }

    #[test]
    fn terminal_size_is_never_zero() {
        let (cols, rows) = TerminalGuard::terminal_size();
        assert!(cols > 0);
        assert!(rows > 0);
    }

    #[test]
    fn io_failures_map_to_terminal_code() {
        let err = terminal_error(io::Error::other("no tty"));
        assert_eq!(err.code(), "BDS-3003");
        assert!(err.to_string().contains("no tty"));
    }
}
