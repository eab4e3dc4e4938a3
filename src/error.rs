//! Error type for draw resolution, table loading and progress persistence.

use crate::tables::RuleType;

#[derive(Debug, thiserror::Error)]
pub enum GachaError {
    /// Malformed or missing table entries. Fatal at load time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid gacha pool id: {0}")]
    InvalidPoolId(String),

    #[error("Gacha pool {0} is temporarily unavailable")]
    ForbiddenPool(String),

    #[error("Rule variant {rule} of pool {pool_id} is not provided by this engine")]
    UnsupportedRuleVariant { pool_id: String, rule: RuleType },

    /// A rule or linkage tag reached dispatch without a handler.
    /// Valid tables never produce this.
    #[error("Invalid rule dispatch: {0}")]
    InvalidRuleDispatch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GachaError {
    /// True for errors that reject a single request without implying broken tables.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidPoolId(_) | Self::ForbiddenPool(_) | Self::UnsupportedRuleVariant { .. }
        )
    }
}

pub type GachaResult<T> = Result<T, GachaError>;
