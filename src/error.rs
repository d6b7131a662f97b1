use thiserror::Error;

/// Request failure. Always fatal to the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Field extraction failure on a single item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("malformed field `{field}`: {detail}")]
    Malformed { field: &'static str, detail: String },
}

impl ExtractError {
    pub fn malformed(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            field,
            detail: detail.into(),
        }
    }
}
