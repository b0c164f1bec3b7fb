use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailEncodingError {
    #[error("invalid header value: {0}")]
    HeaderEncode(String),
    #[error("failed to write encoded output: {0}")]
    Write(#[from] std::io::Error),
}
