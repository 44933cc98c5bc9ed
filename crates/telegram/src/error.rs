use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Bot API rejected the call: {0}")]
    Api(String),

    #[error("Status {status}: {body}")]
    Http { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, TelegramError>;
