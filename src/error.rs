use thiserror::Error;

/// Outcome classification for a single API call.
///
/// `Api` means the server answered and rejected the request; `Network` means
/// no usable response arrived at all (connection refused, timeout, DNS,
/// malformed body).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("server returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Errors surfaced by the client core.
///
/// The first four variants are precondition failures: they indicate a caller
/// bug (operating while logged out, navigating into a name that is not a
/// directory) rather than a runtime condition, and no request is issued for
/// them.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("no entry named `{0}` in the current directory")]
    UnknownEntry(String),

    #[error("`{0}` is not a directory")]
    NotADirectory(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("login response did not include a token")]
    MissingToken,

    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientError {
    /// True for the variants that signal a violated caller-side precondition.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ClientError::NotLoggedIn
                | ClientError::UnknownEntry(_)
                | ClientError::NotADirectory(_)
                | ClientError::InvalidName(_)
        )
    }
}
