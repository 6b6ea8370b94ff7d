use std::string::FromUtf8Error;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The captured output could not be interpreted as UTF-8 text. Protocol
    /// anomalies never take this path; they become diagnostic records.
    #[error("captured gpg output is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
