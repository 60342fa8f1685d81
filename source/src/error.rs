use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}
