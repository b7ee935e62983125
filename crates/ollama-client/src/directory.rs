use std::sync::Arc;

use async_trait::async_trait;
use little_ollama_model::{ErrorKind, ModelDirectory, ModelInfo};
use reqwest::{Client, header};

use crate::proto::{CreateRequest, DeleteRequest, PullRequest, TagsResponse};
use crate::{Error, OllamaConfig, check_status, transport_error};

/// Lists, pulls, creates and deletes models on an Ollama server.
#[derive(Clone, Debug)]
pub struct OllamaDirectory {
    client: Client,
    config: Arc<OllamaConfig>,
}

impl OllamaDirectory {
    /// Creates a new `OllamaDirectory` with the given configuration.
    #[inline]
    pub fn new(config: OllamaConfig) -> Self {
        Self::with_client(Client::new(), Arc::new(config))
    }

    #[inline]
    pub(crate) fn with_client(client: Client, config: Arc<OllamaConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ModelDirectory for OllamaDirectory {
    type Error = Error;

    async fn list(&self) -> Result<Vec<ModelInfo>, Self::Error> {
        let resp = self
            .client
            .get(self.config.endpoint("/api/tags"))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;
        let tags = check_status(resp)
            .await?
            .json::<TagsResponse>()
            .await
            .map_err(|err| {
                Error::new(format!("invalid model list: {err}"), ErrorKind::Other)
            })?;
        debug!("server has {} models", tags.models.len());
        Ok(tags.models)
    }

    async fn pull(&self, name: &str) -> Result<(), Self::Error> {
        let name = validate_name(name)?;
        info!("pulling model {name}");
        let resp = self
            .client
            .post(self.config.endpoint("/api/pull"))
            .json(&PullRequest {
                name,
                stream: false,
            })
            .send()
            .await
            .map_err(transport_error)?;
        check_status(resp).await?;
        Ok(())
    }

    async fn create(
        &self,
        name: &str,
        modelfile: &str,
    ) -> Result<(), Self::Error> {
        let name = validate_name(name)?;
        if modelfile.trim().is_empty() {
            return Err(Error::new(
                "modelfile must not be empty",
                ErrorKind::InvalidInput,
            ));
        }
        info!("creating model {name}");
        let resp = self
            .client
            .post(self.config.endpoint("/api/create"))
            .json(&CreateRequest {
                name,
                modelfile,
                stream: false,
            })
            .send()
            .await
            .map_err(transport_error)?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), Self::Error> {
        let name = validate_name(name)?;
        info!("deleting model {name}");
        let resp = self
            .client
            .delete(self.config.endpoint("/api/delete"))
            .json(&DeleteRequest { name })
            .send()
            .await
            .map_err(transport_error)?;
        check_status(resp).await?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::new(
            "model name must not be empty",
            ErrorKind::InvalidInput,
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use little_ollama_model::ModelProviderError;

    use super::*;
    use crate::OllamaConfigBuilder;

    fn directory() -> OllamaDirectory {
        // Nothing listens here; validation must fail before connecting.
        OllamaDirectory::new(
            OllamaConfigBuilder::new()
                .with_base_url("http://127.0.0.1:9")
                .build(),
        )
    }

    #[tokio::test]
    async fn test_rejects_empty_names() {
        let directory = directory();
        let err = directory.pull("  ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = directory.delete("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = directory.create("", "FROM mistral").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = directory.create("mario", "\n").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.message(), "modelfile must not be empty");
    }

    #[test]
    fn test_request_bodies() {
        assert_eq!(
            serde_json::to_string(&CreateRequest {
                name: "mario",
                modelfile: "FROM mistral\nSYSTEM You are mario.",
                stream: false,
            })
            .unwrap(),
            r#"{"name":"mario","modelfile":"FROM mistral\nSYSTEM You are mario.","stream":false}"#
        );
        assert_eq!(
            serde_json::to_string(&DeleteRequest { name: "mario" }).unwrap(),
            r#"{"name":"mario"}"#
        );
    }

    #[test]
    fn test_tags_response() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[
                {"name":"llava:latest","size":4733363377,"digest":"8dd3"},
                {"name":"mistral:latest","modified_at":"2024-03-01T10:00:00Z"}
            ]}"#,
        )
        .unwrap();
        let names: Vec<_> = tags.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["llava:latest", "mistral:latest"]);

        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }
}
