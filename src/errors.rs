use thiserror::Error;

/// Everything a request can fail with, split by who caused it:
/// `Validation` is always the client, `NotFound` is an empty route
/// lookup, `Store` is the external store, `Internal` is a defect here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("store query '{context}' failed: {source}")]
    Store {
        context: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub(crate) const CC: &'static str = "ApiError";

    pub fn store(context: &str, source: mongodb::error::Error) -> Self {
        ApiError::Store {
            context: context.to_string(),
            source,
        }
    }

    /// Short machine-readable label, mirrored into the error JSON body.
    pub fn label(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation error",
            ApiError::NotFound(_) => "Not found",
            ApiError::Store { .. } => "Internal server error",
            ApiError::Internal(_) => "Internal server error",
        }
    }
}
