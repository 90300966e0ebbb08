use thiserror::Error;

/// Errors raised while applying comment highlights.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    /// The anchored text is gone or has changed.
    #[error("comment {id} no longer matches the post text")]
    Stale { id: String },
}

impl AnchorError {
    /// Id of the comment the error is about.
    pub fn id(&self) -> &str {
        match self {
            Self::Stale { id } => id,
        }
    }
}
