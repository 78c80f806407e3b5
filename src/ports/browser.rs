//! Browser port used by the session initiator.

use crate::error::SaveError;

/// Opens a launch URL for the user.
pub trait BrowserLauncher {
    /// Navigate the user's browser to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Launch`] if no browser could be started.
    fn launch(&self, url: &str) -> Result<(), SaveError>;
}
