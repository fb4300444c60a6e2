use relaychat_ai::LlmConfig;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

const CONFIG_PATH_ENV: &str = "RELAYCHAT_SERVER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "relaychat.toml";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    llm: LlmConfig,
}

#[derive(Debug, Deserialize)]
struct ServerSection {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ServerConfig {
    /// Read the toml file if one is configured or present, else the environment.
    ///
    /// Provider credentials missing from the file are taken from
    /// `XUNFEI_API_KEY` / `XUNFEI_API_URL`. Missing credentials are not an
    /// error here; chat requests report them.
    pub fn load() -> anyhow::Result<Self> {
        let lookup = |key: &str| env::var(key).ok();

        let mut config = match config_file_path() {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::from_lookup(lookup),
        };
        config.fill_credentials(lookup);
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("Failed to read config {}: {}", path.display(), err))?;
        let parsed: FileConfig = toml::from_str(&contents)
            .map_err(|err| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), err))?;

        Ok(Self {
            host: parsed.server.host,
            port: parsed.server.port,
            llm: parsed.llm,
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("RELAYCHAT_SERVER_HOST").unwrap_or_else(default_host);
        let port = lookup("RELAYCHAT_SERVER_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);

        let mut llm = LlmConfig::default();
        if let Some(model) = lookup("RELAYCHAT_MODEL") {
            llm.model = model;
        }

        Self { host, port, llm }
    }

    fn fill_credentials(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("XUNFEI_API_KEY");
        }
        if self.llm.base_url.is_none() {
            self.llm.base_url = lookup("XUNFEI_API_URL");
        }
    }
}

fn config_file_path() -> Option<String> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Some(path);
    }

    Path::new(DEFAULT_CONFIG_FILE)
        .exists()
        .then(|| DEFAULT_CONFIG_FILE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.llm, LlmConfig::default());
    }

    #[test]
    fn test_env_values() {
        let lookup = lookup_from(&[
            ("RELAYCHAT_SERVER_HOST", "127.0.0.1"),
            ("RELAYCHAT_SERVER_PORT", "8081"),
            ("RELAYCHAT_MODEL", "generalv3.5"),
            ("XUNFEI_API_KEY", "sk-env"),
            ("XUNFEI_API_URL", "https://maas.example/v1"),
        ]);
        let mut config = ServerConfig::from_lookup(&lookup);
        config.fill_credentials(&lookup);

        assert_eq!(config.bind_address(), "127.0.0.1:8081");
        assert_eq!(config.llm.model, "generalv3.5");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.llm.base_url.as_deref(), Some("https://maas.example/v1"));
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("RELAYCHAT_SERVER_PORT", "http")]));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_file_config_with_env_credentials() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
[server]
port = 9000

[llm]
base_url = "https://file.example/v1"
temperature = 0.2
"#
        )?;

        let mut config = ServerConfig::from_file(file.path())?;
        config.fill_credentials(lookup_from(&[
            ("XUNFEI_API_KEY", "sk-env"),
            ("XUNFEI_API_URL", "https://env.example/v1"),
        ]));

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.llm.max_tokens, 2048);
        // File values win; env only fills gaps.
        assert_eq!(config.llm.base_url.as_deref(), Some("https://file.example/v1"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-env"));
        Ok(())
    }

    #[test]
    fn test_unparseable_file_is_error() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[server\nport = ")?;

        let err = ServerConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        Ok(())
    }
}
