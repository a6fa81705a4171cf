use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
