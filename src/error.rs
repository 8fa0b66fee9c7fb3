use thiserror::Error;

#[derive(Error, Debug)]
pub enum YapYapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recognizer connection error: {0}")]
    Connection(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Tab error: {0}")]
    Tab(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
