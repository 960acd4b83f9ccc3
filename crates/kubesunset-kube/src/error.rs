//! Error types for kubesunset-kube

use thiserror::Error;

/// Result type for collector operations
pub type Result<T> = std::result::Result<T, CollectError>;

/// Errors that can occur while discovering resources
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Kubeconfig could not be loaded or the context does not exist
    #[error("invalid kubeconfig: {0}")]
    Kubeconfig(String),

    /// Manifest file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest or rule decoding error
    #[error(transparent)]
    Core(#[from] kubesunset_core::CoreError),

    /// Helm release payload could not be decoded
    #[error("failed to decode Helm release '{name}': {message}")]
    HelmRelease { name: String, message: String },

    /// API server reported a version that is not SemVer
    #[error("unrecognized server version '{0}'\nHint: pass --target-version explicitly")]
    ServerVersion(String),

    /// Background task failed to complete
    #[error("collector task failed: {0}")]
    Task(String),
}

impl From<kube::config::KubeconfigError> for CollectError {
    fn from(e: kube::config::KubeconfigError) -> Self {
        CollectError::Kubeconfig(e.to_string())
    }
}

impl From<kube::config::InferConfigError> for CollectError {
    fn from(e: kube::config::InferConfigError) -> Self {
        CollectError::Kubeconfig(e.to_string())
    }
}

impl From<tokio::task::JoinError> for CollectError {
    fn from(e: tokio::task::JoinError) -> Self {
        CollectError::Task(e.to_string())
    }
}

impl CollectError {
    /// Check if this is a Kubernetes 403 Forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, CollectError::Api(kube::Error::Api(resp)) if resp.code == 403)
    }
}
