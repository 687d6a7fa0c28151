/// Convenience result type used across drape.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Pipeline stage that can exceed its time budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// SVG to PNG conversion.
    Rasterize,
    /// Artifact persistence.
    Upload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Rasterize => "rasterize",
            Stage::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Top-level error taxonomy for the composition pipeline.
///
/// The design reducer never produces these; only the orchestrator, the stores,
/// the fetchers and the upload endpoint do.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// Nothing was submitted, or an asset reference is malformed.
    #[error("input error: {0}")]
    Input(String),

    /// Every input was unusable and the composite would carry no content.
    #[error("composition error: {0}")]
    Composition(String),

    /// The renderer could not process the combined SVG.
    #[error("rasterization error: {0}")]
    Rasterization(String),

    /// The artifact store rejected or failed a write.
    #[error("storage error: {0}")]
    Storage(String),

    /// An asset could not be fetched.
    #[error("network error: {0}")]
    Network(String),

    /// A stage ran past its configured time budget.
    #[error("timeout error: {stage} exceeded {millis}ms")]
    Timeout {
        /// Stage that timed out.
        stage: Stage,
        /// Budget that was exceeded, in milliseconds.
        millis: u64,
    },

    /// The caller abandoned the operation before it resolved.
    #[error("cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`DrapeError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`DrapeError::Rasterization`] value.
    pub fn rasterization(msg: impl Into<String>) -> Self {
        Self::Rasterization(msg.into())
    }

    /// Build a [`DrapeError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`DrapeError::Network`] value.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Build a [`DrapeError::Timeout`] value from the exceeded budget.
    pub fn timeout(stage: Stage, budget: std::time::Duration) -> Self {
        Self::Timeout {
            stage,
            millis: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Whether the caller may reasonably retry the same request unchanged.
    ///
    /// Retrying is always the caller's decision; the pipeline never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Storage(_) | Self::Timeout { .. }
        )
    }

    /// Short message suitable for showing to the buyer.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Input(_) => "Nothing was selected. Pick at least one design to add.",
            Self::Network(_) => {
                "A network problem prevented loading your selection. Please try again."
            }
            Self::Cancelled => "The request was cancelled.",
            Self::Composition(_)
            | Self::Rasterization(_)
            | Self::Storage(_)
            | Self::Timeout { .. }
            | Self::Other(_) => "The server could not prepare your design. Please try again.",
        }
    }
}

impl From<reqwest::Error> for DrapeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
