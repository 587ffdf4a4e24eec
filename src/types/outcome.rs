use crate::error_kind::ErrorKind;

/// Result of a studio operation: a payload or exactly one failure kind.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome<T> {
    Success(T),
    Failure(ErrorKind),
}

impl<T> OperationOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success(_))
    }

    pub fn failure(&self) -> Option<&ErrorKind> {
        match self {
            OperationOutcome::Failure(kind) => Some(kind),
            OperationOutcome::Success(_) => None,
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            OperationOutcome::Success(v) => Some(v),
            OperationOutcome::Failure(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationOutcome<U> {
        match self {
            OperationOutcome::Success(v) => OperationOutcome::Success(f(v)),
            OperationOutcome::Failure(kind) => OperationOutcome::Failure(kind),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, ErrorKind> {
        match self {
            OperationOutcome::Success(v) => Ok(v),
            OperationOutcome::Failure(kind) => Err(kind),
        }
    }
}

impl<T> From<std::result::Result<T, ErrorKind>> for OperationOutcome<T> {
    fn from(r: std::result::Result<T, ErrorKind>) -> Self {
        match r {
            Ok(v) => OperationOutcome::Success(v),
            Err(kind) => OperationOutcome::Failure(kind),
        }
    }
}
