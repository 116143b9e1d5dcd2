use dirq_schema::SchemaError;
use thiserror::Error as ThisError;

///
/// CompileError
///
/// Compilation failure taxonomy. All three classes are raised at the point
/// of detection and propagate unchanged to the caller; compilation is pure
/// and deterministic, so there is nothing to retry and nothing is logged
/// or swallowed here. A wrong-but-silent lowering is worse than a hard
/// failure.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    /// A tree shape the compiler does not know how to lower. Always fatal,
    /// never skipped: conditionals, loops, object construction, and lambda
    /// bodies outside the supported comparison set all land here.
    #[error("unsupported query shape ({node}): {detail}")]
    UnsupportedNode { node: &'static str, detail: String },

    /// A supplied literal cannot be converted to its declared field type.
    /// Every offending value is collected before raising, not just the
    /// first.
    #[error("validation failed for field '{field}': {}", failures.join("; "))]
    Validation { field: String, failures: Vec<String> },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CompileError {
    pub(crate) fn unsupported(node: &'static str, detail: impl Into<String>) -> Self {
        Self::UnsupportedNode {
            node,
            detail: detail.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, failures: Vec<String>) -> Self {
        Self::Validation {
            field: field.into(),
            failures,
        }
    }

    /// Stable classification label used by the metrics counters.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnsupportedNode { .. } => ErrorClass::Unsupported,
            Self::Validation { .. } => ErrorClass::Validation,
            Self::Schema(_) => ErrorClass::Schema,
        }
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Unsupported,
    Validation,
    Schema,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unsupported => "unsupported",
            Self::Validation => "validation",
            Self::Schema => "schema",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_failure() {
        let err = CompileError::validation(
            "Members",
            vec!["'x' is not an integer".to_string(), "'y' is not an integer".to_string()],
        );

        assert_eq!(
            err.to_string(),
            "validation failed for field 'Members': 'x' is not an integer; 'y' is not an integer"
        );
    }

    #[test]
    fn schema_errors_pass_through_transparently() {
        let err: CompileError = SchemaError::UnknownEntity {
            entity: "Ghost".to_string(),
        }
        .into();

        assert_eq!(err.to_string(), "unknown entity 'Ghost'");
        assert_eq!(err.class(), ErrorClass::Schema);
    }
}
