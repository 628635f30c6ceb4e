use lexis_core::LexisError;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pack JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pack: {0}")]
    InvalidPack(String),

    #[error("Language mismatch: pack declares {declared}, row has {found}")]
    LanguageMismatch { declared: String, found: String },

    #[error(transparent)]
    Core(#[from] LexisError),
}
