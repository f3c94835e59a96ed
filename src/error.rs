// ⚠️ Portfolio errors
// Every library operation returns PortfolioError; binaries wrap it in anyhow.

/// Errors raised by the portfolio core.
///
/// None of them are retried: each is reported once and the attempted
/// mutation or import leaves the store untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortfolioError {
    /// Missing required field or out-of-range value
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Update/delete targeted an id that is not in the collection
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Supplied file could not be decoded as a workbook or CSV
    #[error("import failed: {0}")]
    ImportDecode(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PortfolioError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        PortfolioError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PortfolioError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PortfolioError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortfolioError::NotFound { .. })
    }
}

pub type PortfolioResult<T> = Result<T, PortfolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PortfolioError::validation("name", "Required field is empty");
        assert_eq!(err.to_string(), "name: Required field is empty");
        assert!(err.is_validation());

        let err = PortfolioError::not_found("domain", "dom-42");
        assert_eq!(err.to_string(), "domain not found: dom-42");
        assert!(err.is_not_found());
    }
}
