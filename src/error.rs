use thiserror::Error;

/// Failures the classification pipeline can report to its caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A required measurement is missing or is not a usable number.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    /// A derived quantity is undefined for the given measurements.
    #[error("inputs are physically inconsistent: `{quantity}` {detail}")]
    Domain { quantity: &'static str, detail: String },
    /// The pretrained model could not be loaded.
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),
}

impl PipelineError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn domain(quantity: &'static str, detail: impl Into<String>) -> Self {
        Self::Domain {
            quantity,
            detail: detail.into(),
        }
    }

    /// The offending input field, for `InvalidInput` errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInput { .. } => 2,
            Self::Domain { .. } => 3,
            Self::ClassifierUnavailable(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
