use thiserror::Error;

/// SerBridge unified error type
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Device enumeration failed: {0}")]
    Enumeration(String),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Unterminated frame exceeded {limit} bytes")]
    FramingOverflow { limit: usize },

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {0}")]
    Output(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
