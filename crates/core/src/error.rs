#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A bounded resource (e.g. dedup suffix letters) ran out.
    #[error("Capacity exceeded: {0}")]
    Capacity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
