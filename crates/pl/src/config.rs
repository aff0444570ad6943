use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use pl_llm::OllamaConfig;
use pl_serve::ServerConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "proclens.toml";
pub const ENV_PREFIX: &str = "PROCLENS_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: OllamaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Like [`AppConfig::load`], after reading `.env` from the working
    /// directory if one exists.
    pub fn load_with_dotenv() -> Result<Self, figment::Error> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Defaults, then `proclens.toml`, then `PROCLENS_*` (`__` between
    /// sections), then `OLLAMA_API_BASE_URL` / `OLLAMA_MODEL`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["log"]).split("__"))
            .merge(ollama_env())
    }
}

fn ollama_env() -> Env {
    Env::raw().filter_map(|key| match key.as_str().to_ascii_uppercase().as_str() {
        "OLLAMA_API_BASE_URL" => Some("llm.api_base_url".into()),
        "OLLAMA_MODEL" => Some("llm.model".into()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;

    #[test]
    fn defaults_apply_without_sources() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::load()?;
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
            assert_eq!(config.server.max_upload_bytes, 50 * 1024 * 1024);
            assert!(config.server.cors_origins.is_empty());
            assert_eq!(config.llm.api_base_url, "http://localhost:11434");
            assert_eq!(config.llm.model, "llama3:8b-instruct");
            assert_eq!(config.llm.timeout_secs, 60);
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [server]
                port = 8080
                upload_dir = "/srv/proclens/uploads"
                cors_origins = ["http://localhost:3000"]

                [llm]
                model = "mistral"
                "#,
            )?;

            let config = AppConfig::load()?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(
                config.server.upload_dir,
                Some(PathBuf::from("/srv/proclens/uploads"))
            );
            assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
            assert_eq!(config.llm.model, "mistral");
            assert_eq!(config.llm.api_base_url, "http://localhost:11434");
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[server]\nport = 8080\n")?;
            jail.set_env("PROCLENS_SERVER__PORT", "9090");
            jail.set_env("PROCLENS_LLM__TIMEOUT_SECS", "5");
            jail.set_env("PROCLENS_LOG", "debug");

            let config = AppConfig::load()?;
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.llm.timeout_secs, 5);
            Ok(())
        });
    }

    #[test]
    fn ollama_variables_win() {
        Jail::expect_with(|jail| {
            jail.set_env("PROCLENS_LLM__MODEL", "from-prefixed");
            jail.set_env("OLLAMA_MODEL", "phi3");
            jail.set_env("OLLAMA_API_BASE_URL", "http://gpu-box:11434");

            let config = AppConfig::load()?;
            assert_eq!(config.llm.model, "phi3");
            assert_eq!(config.llm.api_base_url, "http://gpu-box:11434");
            Ok(())
        });
    }
}
