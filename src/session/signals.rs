//! OS signals mapped onto the session's abort token.

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::core::errors::{BeadsError, Result};
use crate::present::AbortToken;

/// SIGINT and SIGTERM set `token`, exactly as Esc does.
///
/// # Errors
/// Returns `Terminal` if a handler cannot be registered.
pub fn install(token: &AbortToken) -> Result<()> {
    for signal in [SIGINT, SIGTERM] {
        flag::register(signal, token.shared_flag()).map_err(|e| BeadsError::Terminal {
            details: format!("cannot register handler for signal {signal}: {e}"),
        })?;
    }
    Ok(())
}
