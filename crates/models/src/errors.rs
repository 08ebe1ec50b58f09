use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
}

impl ModelError {
    pub fn invalid(field: &str, value: impl std::fmt::Display) -> Self {
        Self::Validation(format!("invalid {field}: {value}"))
    }
}
