//! Error types for the merchant API client

use bytes::Bytes;
use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by a [`Transport`](crate::transport::Transport)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client errors
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure (connection, TLS, timeout, body read)
    #[error("http request failed: {0}")]
    Transport(#[source] BoxError),

    /// HTTP status >= 300
    #[error("unexpected http status code {0}")]
    UnexpectedStatus(u16),

    /// Provider reported an error inside the reply
    #[error("xml response with error: {0}")]
    Business(String),

    /// Reply does not have the envelope shape
    #[error("unexpected xml response content: {0}")]
    MalformedEnvelope(MalformedEnvelope),

    /// Merchant id or signature mismatch
    #[error("xml response with invalid signature")]
    InvalidSignature,

    /// Payload does not fit the requested type
    #[error("can`t unmarshal xml response: {0}")]
    Decode(String),

    /// Malformed amount/funds text
    #[error("parsing {0}")]
    Parse(String),

    /// Element not found (or unbalanced) in a buffer
    #[error("not found")]
    NotFound,

    /// Endpoint options rejected before sending
    #[error("invalid request options: {0}")]
    InvalidOptions(String),

    /// Request serialization error
    #[error("can`t marshal request: {0}")]
    Encode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error annotated with the exchange that produced it
    #[error(transparent)]
    Call(Box<CallError>),
}

/// Ways a reply can fail the structural check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedEnvelope {
    /// Not well-formed XML
    #[error("can`t parse: {0}")]
    Unparsable(String),

    /// Well-formed, but the expected payload element is absent
    #[error("missing {0}")]
    MissingPayload(String),

    /// Well-formed, but an element that must be unique appears more than once
    #[error("duplicate {0}")]
    Duplicate(String),
}

/// Annotation attached to every failure of a single API call
#[derive(Error, Debug)]
#[error("{method} {url}: {source}")]
pub struct CallError {
    /// Target URL
    pub url: String,
    /// HTTP method
    pub method: String,
    /// Exact request body sent
    pub request: Bytes,
    /// Response body, when one was received
    pub response: Option<Bytes>,
    /// Underlying error
    #[source]
    pub source: Error,
}

/// Programmatic classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Transport`]
    Transport,
    /// See [`Error::UnexpectedStatus`]
    UnexpectedStatus,
    /// See [`Error::Business`]
    Business,
    /// See [`Error::MalformedEnvelope`]
    MalformedEnvelope,
    /// See [`Error::InvalidSignature`]
    InvalidSignature,
    /// See [`Error::Decode`]
    Decode,
    /// See [`Error::Parse`]
    Parse,
    /// See [`Error::NotFound`]
    NotFound,
    /// See [`Error::InvalidOptions`]
    InvalidOptions,
    /// See [`Error::Encode`]
    Encode,
    /// See [`Error::Config`]
    Config,
}

impl ErrorKind {
    /// Stable label (used for metrics)
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::UnexpectedStatus => "unexpected_status",
            ErrorKind::Business => "business",
            ErrorKind::MalformedEnvelope => "malformed_envelope",
            ErrorKind::InvalidSignature => "invalid_signature",
            ErrorKind::Decode => "decode",
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidOptions => "invalid_options",
            ErrorKind::Encode => "encode",
            ErrorKind::Config => "config",
        }
    }
}

impl Error {
    /// Kind of the innermost error, looking through call annotations
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::UnexpectedStatus(_) => ErrorKind::UnexpectedStatus,
            Error::Business(_) => ErrorKind::Business,
            Error::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            Error::InvalidSignature => ErrorKind::InvalidSignature,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Parse(_) => ErrorKind::Parse,
            Error::NotFound => ErrorKind::NotFound,
            Error::InvalidOptions(_) => ErrorKind::InvalidOptions,
            Error::Encode(_) => ErrorKind::Encode,
            Error::Config(_) => ErrorKind::Config,
            Error::Call(call) => call.source.kind(),
        }
    }

    /// Innermost error
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Error::Call(call) = err {
            err = &call.source;
        }
        err
    }

    /// Call annotation, if this error came out of [`Client::send`](crate::Client::send)
    pub fn call(&self) -> Option<&CallError> {
        match self {
            Error::Call(call) => Some(call),
            _ => None,
        }
    }

    pub(crate) fn annotate(
        self,
        url: &str,
        method: &reqwest::Method,
        request: &Bytes,
        response: Option<&Bytes>,
    ) -> Self {
        Error::Call(Box::new(CallError {
            url: url.to_string(),
            method: method.to_string(),
            request: request.clone(),
            response: response.cloned(),
            source: self,
        }))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_looks_through_annotations() {
        let request = Bytes::from_static(b"<request/>");
        let err = Error::InvalidSignature.annotate(
            "http://localhost",
            &reqwest::Method::POST,
            &request,
            None,
        );

        assert_eq!(err.kind(), ErrorKind::InvalidSignature);
        assert!(matches!(err.root(), Error::InvalidSignature));

        let call = err.call().unwrap();
        assert_eq!(call.url, "http://localhost");
        assert_eq!(call.method, "POST");
        assert_eq!(call.request, request);
        assert!(call.response.is_none());
        assert_eq!(
            err.to_string(),
            "POST http://localhost: xml response with invalid signature"
        );
    }

    #[test]
    fn test_malformed_envelope_messages() {
        let err = Error::MalformedEnvelope(MalformedEnvelope::MissingPayload("data".into()));
        assert_eq!(err.to_string(), "unexpected xml response content: missing data");
        assert_eq!(err.kind().as_str(), "malformed_envelope");
    }
}
