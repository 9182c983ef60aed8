#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{ratio} is undefined (division by zero)")]
    UndefinedRatio { ratio: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("simulation superseded by newer input")]
    Cancelled,
}

impl EngineError {
    pub(crate) fn invalid_input(field: &'static str, reason: &'static str) -> Self {
        EngineError::InvalidInput { field, reason }
    }
}
