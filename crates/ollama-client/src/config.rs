/// Builder for [`OllamaConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OllamaConfigBuilder {
    base_url: Option<String>,
}

impl OllamaConfigBuilder {
    /// Creates a builder with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom base URL, e.g. `http://192.168.1.2:11434`.
    ///
    /// A bare `host[:port]` without scheme is accepted, the way
    /// `OLLAMA_HOST` is usually written. `http://` and port 11434 are
    /// assumed then.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> OllamaConfig {
        let base_url = self
            .base_url
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        OllamaConfig { base_url }
    }
}

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_PORT: u16 = 11434;

fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    // An explicit scheme carries its own default port.
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    let (authority, path) = url.split_at(url.find('/').unwrap_or(url.len()));
    if has_port(authority) {
        format!("http://{url}")
    } else {
        format!("http://{authority}:{DEFAULT_PORT}{path}")
    }
}

fn has_port(authority: &str) -> bool {
    // Skip the brackets of an IPv6 literal like `[::1]:11434`.
    let host_end = authority.rfind(']').map_or(0, |idx| idx + 1);
    authority[host_end..].contains(':')
}

/// Configuration for the Ollama provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OllamaConfig {
    pub(crate) base_url: String,
}

impl OllamaConfig {
    /// Returns the base URL of the server.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(
            OllamaConfigBuilder::new().build().base_url(),
            "http://localhost:11434"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("http://gpu-box:11434/")
                .build()
                .endpoint("/api/tags"),
            "http://gpu-box:11434/api/tags"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("0.0.0.0:11434")
                .build()
                .base_url(),
            "http://0.0.0.0:11434"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("0.0.0.0")
                .build()
                .endpoint("/api/tags"),
            "http://0.0.0.0:11434/api/tags"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("[::1]")
                .build()
                .base_url(),
            "http://[::1]:11434"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("[::1]:8080")
                .build()
                .base_url(),
            "http://[::1]:8080"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("gpu-box/ollama/")
                .build()
                .base_url(),
            "http://gpu-box:11434/ollama"
        );
        assert_eq!(
            OllamaConfigBuilder::new()
                .with_base_url("https://ollama.example.com")
                .build()
                .base_url(),
            "https://ollama.example.com"
        );
        assert_eq!(
            OllamaConfigBuilder::new().with_base_url(" ").build().base_url(),
            "http://localhost:11434"
        );
    }
}
