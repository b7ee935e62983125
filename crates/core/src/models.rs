//! Picking models for the chat and vision flows.

use little_ollama_model::{ModelDirectory, ModelInfo};

/// Vision models the image flow knows how to prompt, in preference order.
pub const VISION_MODELS: [&str; 2] = ["bakllava:latest", "llava:latest"];

/// The vision model hidden from the chat flow.
const CHAT_EXCLUDED_MODEL: &str = "llava:latest";

/// What a model is going to be used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelPurpose {
    /// Text chat with history.
    Chat,
    /// Questions about an image.
    Vision,
}

/// Returns the installed models suitable for text chat.
pub fn chat_model_names(models: &[ModelInfo]) -> Vec<String> {
    models
        .iter()
        .filter(|m| !m.name.eq_ignore_ascii_case(CHAT_EXCLUDED_MODEL))
        .map(|m| m.name.clone())
        .collect()
}

/// Returns the installed vision models, in [`VISION_MODELS`] order.
pub fn vision_model_names(models: &[ModelInfo]) -> Vec<String> {
    VISION_MODELS
        .iter()
        .filter(|name| models.iter().any(|m| m.name == **name))
        .map(|name| name.to_string())
        .collect()
}

/// Returns the vision models that still need to be pulled.
pub fn missing_vision_models(models: &[ModelInfo]) -> Vec<&'static str> {
    VISION_MODELS
        .iter()
        .copied()
        .filter(|name| !models.iter().any(|m| m.name == *name))
        .collect()
}

/// Resolves the model to use.
///
/// An explicitly requested model is used as is, without asking the
/// server. Otherwise the first installed model for `purpose` is picked,
/// or `None` if there isn't any.
pub async fn resolve_model<D: ModelDirectory>(
    directory: &D,
    requested: Option<&str>,
    purpose: ModelPurpose,
) -> Result<Option<String>, D::Error> {
    if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(Some(name.to_owned()));
    }

    let models = directory.list().await?;
    let candidates = match purpose {
        ModelPurpose::Chat => chat_model_names(&models),
        ModelPurpose::Vision => vision_model_names(&models),
    };
    debug!("{} candidate models for {purpose:?}", candidates.len());
    Ok(candidates.into_iter().next())
}

#[cfg(test)]
mod tests {
    use little_ollama_test_model::TestModelDirectory;

    use super::*;

    fn infos(names: &[&str]) -> Vec<ModelInfo> {
        names
            .iter()
            .map(|name| ModelInfo {
                name: name.to_string(),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_chat_models_hide_llava() {
        let models = infos(&["LLaVA:latest", "mistral:latest", "llava:13b"]);
        assert_eq!(chat_model_names(&models), ["mistral:latest", "llava:13b"]);
    }

    #[test]
    fn test_vision_models() {
        let models = infos(&["llava:latest", "mistral:latest"]);
        assert_eq!(vision_model_names(&models), ["llava:latest"]);
        assert_eq!(missing_vision_models(&models), ["bakllava:latest"]);

        let models = infos(&["llava:latest", "bakllava:latest"]);
        assert_eq!(
            vision_model_names(&models),
            ["bakllava:latest", "llava:latest"]
        );
        assert!(missing_vision_models(&models).is_empty());
    }

    #[tokio::test]
    async fn test_resolve_model() {
        let directory =
            TestModelDirectory::with_models(["llava:latest", "phi3:mini"]);
        let chat = resolve_model(&directory, None, ModelPurpose::Chat).await;
        assert_eq!(chat.unwrap().as_deref(), Some("phi3:mini"));
        let vision =
            resolve_model(&directory, None, ModelPurpose::Vision).await;
        assert_eq!(vision.unwrap().as_deref(), Some("llava:latest"));

        let mut offline = directory.clone();
        offline.set_offline(true);
        let requested =
            resolve_model(&offline, Some(" gemma:2b "), ModelPurpose::Chat);
        assert_eq!(requested.await.unwrap().as_deref(), Some("gemma:2b"));
        assert!(
            resolve_model(&offline, None, ModelPurpose::Chat).await.is_err()
        );

        let empty = TestModelDirectory::default();
        let none = resolve_model(&empty, Some(""), ModelPurpose::Vision).await;
        assert_eq!(none.unwrap(), None);
    }
}
