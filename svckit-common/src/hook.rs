//! Observers attached to the logger.

use std::sync::Arc;
use thiserror::Error;

use crate::level::Level;
use crate::record::LogRecord;

/// Error reported by a hook. Never interrupts local logging.
#[derive(Debug, Clone, Error)]
#[error("hook failed: {0}")]
pub struct HookError(pub String);

/// Receives every accepted record whose level is in [`Hook::levels`].
///
/// Level filtering against the logger's minimum happens before hooks run.
pub trait Hook: Send + Sync {
    /// Levels this hook wants to see.
    fn levels(&self) -> &[Level] {
        &Level::ALL
    }

    fn fire(&self, record: &LogRecord) -> Result<(), HookError>;
}

/// Something hooks can be attached to.
pub trait HookRegistry {
    fn add_hook(&self, hook: Arc<dyn Hook>);

    /// Detach a previously added hook. Returns `false` if it was not attached.
    fn remove_hook(&self, hook: &Arc<dyn Hook>) -> bool;
}
