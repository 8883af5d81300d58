//! Snapshot tests for the Ollama client

#[cfg(test)]
mod snapshot_tests {
    use crate::{EmbeddingProvider, LLMProvider, OllamaClient, OllamaConfig};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_config_snapshot() {
        let config = OllamaConfig::new("http://ollama.internal:11434/");

        assert_yaml_snapshot!(config, @r###"
        ---
        base_url: "http://ollama.internal:11434"
        model: "gemma3:1b"
        embedding_model: mxbai-embed-large
        timeout_secs: 60
        "###);
    }

    #[test]
    fn test_client_models() {
        let client = OllamaClient::new(OllamaConfig::default()).unwrap();

        assert_yaml_snapshot!(client.model_id(), @r###"
        ---
        "gemma3:1b"
        "###);
        assert_eq!(client.embedding_model(), "mxbai-embed-large");
        assert_eq!(client.config().timeout().as_secs(), 60);
    }
}
