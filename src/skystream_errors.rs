use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkystreamError {
    #[error("Archive token not found in environment variable {0}")]
    MissingArchiveToken(String),

    #[error("Invalid date string: {0}")]
    InvalidDateFormat(String),

    #[error("Archive rejected the stream query: {0}")]
    QueryRejected(String),

    #[error("Archive stream not ready yet (HTTP {0})")]
    StreamNotReady(u16),

    #[error("Archive stream still not ready after {waited_secs}s of retries")]
    StreamTimeout { waited_secs: u64 },

    #[error("Alert stream request failed with HTTP {status}: {body}")]
    StreamFailure { status: u16, body: String },

    #[error("Unable to persist the resume token cache: {0}")]
    CachePersist(String),

    #[error("Unexpected archive response: {0}")]
    UnexpectedResponse(String),

    #[error("HTTP ureq error: {0}")]
    UreqHttpError(#[from] ureq::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for SkystreamError {
    fn eq(&self, other: &Self) -> bool {
        use SkystreamError::*;
        match (self, other) {
            (MissingArchiveToken(a), MissingArchiveToken(b)) => a == b,
            (InvalidDateFormat(a), InvalidDateFormat(b)) => a == b,
            (QueryRejected(a), QueryRejected(b)) => a == b,
            (StreamNotReady(a), StreamNotReady(b)) => a == b,
            (StreamTimeout { waited_secs: a }, StreamTimeout { waited_secs: b }) => a == b,
            (
                StreamFailure { status: a, body: ab },
                StreamFailure { status: b, body: bb },
            ) => a == b && ab == bb,
            (CachePersist(a), CachePersist(b)) => a == b,
            (UnexpectedResponse(a), UnexpectedResponse(b)) => a == b,

            // Transport errors are not comparable: equality holds on same variant
            (UreqHttpError(_), UreqHttpError(_)) => true,
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
