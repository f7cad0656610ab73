use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    ReservedComma {
        field: &'static str,
        value: String,
    },
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
        actual: u64,
    },
    BinaryTooLarge {
        max: usize,
        actual: usize,
    },
    IncompleteBinary,
    NotApplicable {
        field: &'static str,
    },
    InvalidSchedule,
    InvalidDateRange {
        field: &'static str,
    },
    Malformed {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::ReservedComma { field, value } => {
                write!(f, "{field} must not contain a comma: {value:?}")
            }
            Self::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(
                f,
                "{field} out of range: {actual} (expected {min}..={max})"
            ),
            Self::BinaryTooLarge { max, actual } => {
                write!(f, "binary body and udh too large: {actual} bytes (max {max})")
            }
            Self::IncompleteBinary => write!(f, "binary body and udh must be set together"),
            Self::NotApplicable { field } => {
                write!(f, "{field} does not apply to this message type")
            }
            Self::InvalidSchedule => write!(f, "expire_at must be after send_at"),
            Self::InvalidDateRange { field } => {
                write!(f, "{field}: start must not be after end")
            }
            Self::Malformed { field, reason } => write!(f, "malformed {field}: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}
