use thiserror::Error;

/// Boxed cause carried by network failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a [`Transport`](crate::transport::Transport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// DNS, TLS, connection reset, or a broken body stream.
    #[error("Network failure: {0}")]
    Network(#[source] BoxError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl TransportError {
    pub fn network(cause: impl Into<BoxError>) -> Self {
        TransportError::Network(cause.into())
    }

    pub fn http(status: u16, body: impl Into<String>) -> Self {
        TransportError::Http {
            status,
            body: body.into(),
        }
    }
}

/// Errors that can occur when talking to a model provider.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API key is required for this provider")]
    MissingApiKey,

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Error::InvalidResponse(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// HTTP status reported by the vendor, if this is an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => Error::Api { status, body },
            TransportError::Network(cause) => Error::Network(cause),
        }
    }
}
