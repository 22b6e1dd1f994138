use thiserror::Error;

/// Errors returned by implementations of the peer connection and sink traits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The peer connection could not be created or has been closed.
    #[error("Peer connection failed: {0}")]
    PeerConnectionFailed(String),

    /// Applying or generating a session description failed.
    #[error("SDP negotiation failed: {0}")]
    NegotiationFailed(String),

    /// The session description could not be parsed or has the wrong type.
    #[error("Invalid session description: {0}")]
    InvalidDescription(String),

    /// A track id was handed to a media sink that never saw it attached.
    #[error("Unknown track: {0}")]
    TrackNotFound(String),

    /// The operation is not supported by this implementation.
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// An internal error occurred in the implementation. This may indicate a bug.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Generic I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::IoError(err.to_string())
    }
}
