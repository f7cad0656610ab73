use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Structured application error returned with 400 or 403 responses.
pub struct ApiError {
    /// Machine-readable code, e.g. `syntax_constraint_violation`.
    pub code: String,
    pub text: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.text)
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Alternate error shape produced by the service's HTTP front end for
/// requests it rejects before they reach the application.
pub struct BadRequestError {
    pub status: u16,
    pub path: String,
    /// Raw timestamp as sent; the front end emits either epoch millis or text.
    pub timestamp: Option<String>,
    pub error: String,
    pub message: Option<String>,
}

impl fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.status, self.error, self.path)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BadRequestError {}
