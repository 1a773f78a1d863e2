/// Errors raised by the domain rules in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A value is outside the range the rule accepts.
    #[error("Validation failed: {0}")]
    Validation(String),
}
