use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division error: {0}")]
    Division(String),

    #[error("Statistical procedure error: {0}")]
    StatisticalProcedure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CoreError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::MissingField(_) => "missing_field",
            CoreError::InsufficientData(_) => "insufficient_data",
            CoreError::Division(_) => "division",
            CoreError::StatisticalProcedure(_) => "statistical_procedure",
            CoreError::Validation(_) => "validation",
            CoreError::Serialization(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

// Implement From for common error types
impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        CoreError::Validation(err.to_string())
    }
}
