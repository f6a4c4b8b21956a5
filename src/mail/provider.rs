use thiserror::Error;

use crate::domain::email::{EmailSummary, ProviderIndex};

/// Failures reported by a mail provider. Cloned into the view state, so
/// every variant carries owned text only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The mail client is not running or cannot be automated.
    #[error("mail client unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The position no longer exists in the current unread set.
    #[error("message {index} is no longer in the unread set (index out of range)")]
    IndexStale { index: ProviderIndex },

    #[error("{0}")]
    Unknown(String),
}

impl ProviderError {
    pub fn hint(&self) -> &'static str {
        match self {
            ProviderError::Unavailable(_) => "Make sure Mail.app is running.",
            ProviderError::PermissionDenied(_) => {
                "Grant automation access to Mail in System Settings > Privacy & Security."
            }
            ProviderError::IndexStale { .. } => {
                "The mailbox changed since the last refresh. Refresh and try again."
            }
            ProviderError::Unknown(_) => {
                "Make sure Mail.app is running and permissions are granted."
            }
        }
    }
}

/// The three queries the UI needs from a mail client. Calls are blocking.
///
/// Positions handed to [`MailProvider::fetch_body`] come from an earlier
/// [`MailProvider::list_unread`] call; if the unread set changed in between,
/// the body of a different message may be returned.
pub trait MailProvider: Send + Sync {
    /// At most the provider's cap of unread messages, in provider order.
    fn list_unread(&self) -> Result<Vec<EmailSummary>, ProviderError>;

    /// Plain text body of the message at `index`; marks it read.
    fn fetch_body(&self, index: ProviderIndex) -> Result<String, ProviderError>;

    fn mark_all_read(&self) -> Result<(), ProviderError>;
}
