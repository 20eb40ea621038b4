#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A response parsed correctly but carried nothing usable.
    #[error("Empty response: {0}")]
    EmptyResponse(&'static str),
}
