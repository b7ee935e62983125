use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::ModelProviderError;

/// A model installed on the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelInfo {
    /// The model name including its tag, e.g. `llava:latest`.
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last modification time as reported by the server.
    #[serde(default)]
    pub modified_at: String,
    /// Content digest.
    #[serde(default)]
    pub digest: String,
}

/// Lifecycle operations on the models of a server.
///
/// Every method is a single round trip. Implementations must not retry,
/// and must not keep any state besides what the server keeps.
#[async_trait]
pub trait ModelDirectory: Send + Sync {
    /// The error type that may be returned by the directory.
    type Error: ModelProviderError;

    /// Lists the installed models.
    async fn list(&self) -> Result<Vec<ModelInfo>, Self::Error>;

    /// Downloads a model from the registry.
    async fn pull(&self, name: &str) -> Result<(), Self::Error>;

    /// Creates a model from a modelfile.
    async fn create(&self, name: &str, modelfile: &str)
    -> Result<(), Self::Error>;

    /// Deletes an installed model.
    async fn delete(&self, name: &str) -> Result<(), Self::Error>;
}
