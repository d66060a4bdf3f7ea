//! Domain errors for the codec and the coherence tracker
//!
//! The application layer wraps these in `eyre::Report`, but callers that need
//! to tell a bad line from a missing agent can match on the variants.

/// Errors raised by protocol and tracker operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum McbError {
    #[error("Malformed message: {reason}")]
    MalformedMessage { reason: String },

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Value out of range for {name}: {value}")]
    OutOfRangeValue { name: &'static str, value: String },
}

impl McbError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage { reason: reason.into() }
    }
}

pub type McbResult<T> = std::result::Result<T, McbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = McbError::malformed("missing delimiter");
        assert_eq!(err.to_string(), "Malformed message: missing delimiter");

        let err = McbError::UnknownAgent("ghost".to_string());
        assert_eq!(err.to_string(), "Unknown agent: ghost");
    }

    #[test]
    fn test_error_converts_to_eyre() {
        fn lookup() -> eyre::Result<()> {
            Err(McbError::UnknownAgent("ghost".to_string()))?;
            Ok(())
        }

        let report = lookup().unwrap_err();
        assert!(matches!(
            report.downcast_ref::<McbError>(),
            Some(McbError::UnknownAgent(id)) if id == "ghost"
        ));
    }
}
