use thiserror::Error;

#[derive(Debug, Error)]
pub enum PassportError {
    #[error("Image processing error: {0}")]
    ImageProcessing(String),
    #[error("Recognition error: {0}")]
    Recognition(String),
    #[error("IO error: {0}")]
    Io(String),
}
