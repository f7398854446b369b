//! Domain error types.

/// Top-level error type for quantfolio.
#[derive(Debug, thiserror::Error)]
pub enum QuantfolioError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&QuantfolioError> for std::process::ExitCode {
    fn from(err: &QuantfolioError) -> Self {
        let code: u8 = match err {
            QuantfolioError::Io(_) => 1,
            QuantfolioError::ConfigParse { .. }
            | QuantfolioError::ConfigMissing { .. }
            | QuantfolioError::ConfigInvalid { .. } => 2,
            QuantfolioError::Data { .. } => 3,
            QuantfolioError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
