// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Decode error: {0}")]
    Decode(String), // Bytes handed to us are not a valid image
    #[error("Encode error: {0}")]
    Encode(String), // Turning the surface into PNG failed
    #[error("Clipboard error: {0}")]
    Clipboard(String), // Clipboard read/write refused or failed
    #[error("File access error: {0}")]
    FileAccess(String), // Reading/writing a picked or downloaded file failed
    #[error("Share error: {0}")]
    Share(String), // Handing a file to the system failed
    #[error("Config error: {0}")]
    Config(String), // Config file has values we cannot use
    /// The user dismissed a picker or share sheet. Not a failure: the
    /// bridge turns this into a quiet no-op.
    #[error("operation aborted by the user")]
    Aborted,
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(e) => Error::Encode(e.to_string()),
            other => Error::Decode(other.to_string()),
        }
    }
}
