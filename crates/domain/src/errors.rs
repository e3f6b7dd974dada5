use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Io(e.to_string())
    }
}
