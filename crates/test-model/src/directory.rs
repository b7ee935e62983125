use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use little_ollama_model::{ErrorKind, ModelDirectory, ModelInfo};

use crate::Error;

/// An in-memory model directory.
///
/// Pulled and created models are added with a `latest` tag when no tag
/// is given, the way the real server names them.
#[derive(Clone, Default)]
pub struct TestModelDirectory {
    models: Arc<Mutex<Vec<ModelInfo>>>,
    offline: bool,
}

impl TestModelDirectory {
    /// Creates a directory with the given installed models.
    pub fn with_models<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = names
            .into_iter()
            .map(|name| ModelInfo {
                name: name.into(),
                ..Default::default()
            })
            .collect();
        Self {
            models: Arc::new(Mutex::new(models)),
            offline: false,
        }
    }

    /// Makes every operation fail as if the server were unreachable.
    #[inline]
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Returns the names of the installed models.
    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|m| m.name.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ModelInfo>> {
        self.models.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn check_online(&self) -> Result<(), Error> {
        if self.offline {
            return Err(Error::new("connection refused", ErrorKind::Transport));
        }
        Ok(())
    }

    fn add(&self, name: &str) -> Result<(), Error> {
        if name.trim().is_empty() {
            return Err(Error::new(
                "model name must not be empty",
                ErrorKind::InvalidInput,
            ));
        }
        let name = with_tag(name.trim());
        let mut models = self.lock();
        if !models.iter().any(|m| m.name == name) {
            models.push(ModelInfo {
                name,
                ..Default::default()
            });
        }
        Ok(())
    }
}

fn with_tag(name: &str) -> String {
    if name.contains(':') {
        name.to_owned()
    } else {
        format!("{name}:latest")
    }
}

#[async_trait]
impl ModelDirectory for TestModelDirectory {
    type Error = Error;

    async fn list(&self) -> Result<Vec<ModelInfo>, Self::Error> {
        self.check_online()?;
        Ok(self.lock().clone())
    }

    async fn pull(&self, name: &str) -> Result<(), Self::Error> {
        self.check_online()?;
        self.add(name)
    }

    async fn create(
        &self,
        name: &str,
        modelfile: &str,
    ) -> Result<(), Self::Error> {
        self.check_online()?;
        if modelfile.trim().is_empty() {
            return Err(Error::new(
                "modelfile must not be empty",
                ErrorKind::InvalidInput,
            ));
        }
        self.add(name)
    }

    async fn delete(&self, name: &str) -> Result<(), Self::Error> {
        self.check_online()?;
        let name = with_tag(name.trim());
        let mut models = self.lock();
        let Some(idx) = models.iter().position(|m| m.name == name) else {
            return Err(Error::new(
                format!("404 Not Found: model '{name}' not found"),
                ErrorKind::Transport,
            ));
        };
        models.remove(idx);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use little_ollama_model::ModelProviderError;

    use super::*;

    #[tokio::test]
    async fn test_lifecycle() {
        let directory = TestModelDirectory::with_models(["llava:latest"]);
        directory.pull("mistral").await.unwrap();
        directory.create("mario", "FROM mistral").await.unwrap();
        assert_eq!(
            directory.names(),
            ["llava:latest", "mistral:latest", "mario:latest"]
        );

        directory.delete("mistral").await.unwrap();
        let err = directory.delete("mistral").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let mut offline = directory.clone();
        offline.set_offline(true);
        assert!(offline.list().await.is_err());
        assert_eq!(directory.list().await.unwrap().len(), 2);
    }
}
