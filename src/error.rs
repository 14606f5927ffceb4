use thiserror::Error;

#[derive(Error, Debug)]
pub enum IspError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Read timed out, or the bytes that did arrive were not valid text
    #[error("Timed out waiting for data")]
    Timeout,

    #[error("Device is disconnected")]
    Disconnected,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type IspResult<T> = std::result::Result<T, IspError>;
