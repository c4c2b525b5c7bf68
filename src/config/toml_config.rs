use crate::adapters::resolver::{ChainResolver, RemoteResolver, ZipTable, DEFAULT_TIMEOUT};
use crate::adapters::{LeadStore, LocalStorage, ServiceAreaStore};
use crate::adapters::{leads::DEFAULT_LEADS_FILE, service_areas::DEFAULT_SERVICE_AREAS_FILE};
use crate::domain::ports::CoordinateResolver;
use crate::utils::error::{GateError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static env pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub resolver: ResolverConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub service_areas_file: Option<String>,
    pub leads_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Table,
    Remote,
    Chain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub r#type: ResolverKind,
    pub table_path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GateError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ZIPGATE_DATA_DIR})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("storage.data_dir", &self.storage.data_dir)?;

        match self.resolver.r#type {
            ResolverKind::Table => self.validate_table()?,
            ResolverKind::Remote => self.validate_remote()?,
            ResolverKind::Chain => {
                self.validate_table()?;
                self.validate_remote()?;
            }
        }

        if let Some(timeout_ms) = self.resolver.timeout_ms {
            validation::validate_range("resolver.timeout_ms", timeout_ms, 50, 30_000)?;
        }

        Ok(())
    }

    fn validate_table(&self) -> Result<()> {
        let path = validation::validate_required_field("resolver.table_path", &self.resolver.table_path)?;
        validation::validate_path("resolver.table_path", path)?;
        validation::validate_file_extension("resolver.table_path", path, &["csv"])
    }

    fn validate_remote(&self) -> Result<()> {
        let endpoint = validation::validate_required_field("resolver.endpoint", &self.resolver.endpoint)?;
        validation::validate_url("resolver.endpoint", endpoint)
    }

    pub fn service_areas_file(&self) -> &str {
        self.storage
            .service_areas_file
            .as_deref()
            .unwrap_or(DEFAULT_SERVICE_AREAS_FILE)
    }

    pub fn leads_file(&self) -> &str {
        self.storage.leads_file.as_deref().unwrap_or(DEFAULT_LEADS_FILE)
    }

    pub fn timeout(&self) -> Duration {
        self.resolver
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn storage(&self) -> LocalStorage {
        LocalStorage::new(&self.storage.data_dir)
    }

    pub fn service_area_store(&self) -> ServiceAreaStore<LocalStorage> {
        ServiceAreaStore::new(self.storage(), self.service_areas_file())
    }

    pub fn lead_store(&self) -> LeadStore<LocalStorage> {
        LeadStore::new(self.storage(), self.leads_file())
    }

    /// Builds the configured resolver. Call `validate` first.
    pub fn build_resolver(&self) -> Result<Arc<dyn CoordinateResolver>> {
        let resolver: Arc<dyn CoordinateResolver> = match self.resolver.r#type {
            ResolverKind::Table => Arc::new(self.load_table()?),
            ResolverKind::Remote => Arc::new(self.remote()?),
            ResolverKind::Chain => Arc::new(
                ChainResolver::new()
                    .then(self.load_table()?)
                    .then(self.remote()?),
            ),
        };
        Ok(resolver)
    }

    fn load_table(&self) -> Result<ZipTable> {
        let path = validation::validate_required_field("resolver.table_path", &self.resolver.table_path)?;
        ZipTable::from_path(path)
    }

    fn remote(&self) -> Result<RemoteResolver> {
        let endpoint = validation::validate_required_field("resolver.endpoint", &self.resolver.endpoint)?;
        RemoteResolver::new(endpoint.as_str(), self.timeout())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_table_config() {
        let toml_content = r#"
[storage]
data_dir = "./data"

[resolver]
type = "table"
table_path = "data/zip_centroids.csv"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.resolver.r#type, ResolverKind::Table);
        assert_eq!(config.service_areas_file(), "service_areas.toml");
        assert_eq!(config.leads_file(), "leads.csv");
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.log_level(), "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ZIPGATE_TEST_DATA_DIR", "/var/lib/zipgate");

        let toml_content = r#"
[storage]
data_dir = "${ZIPGATE_TEST_DATA_DIR}"

[resolver]
type = "remote"
endpoint = "https://api.zippopotam.us/us"
timeout_ms = 500
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/zipgate");
        assert_eq!(config.timeout(), Duration::from_millis(500));

        std::env::remove_var("ZIPGATE_TEST_DATA_DIR");
    }

    #[test]
    fn test_remote_requires_endpoint() {
        let toml_content = r#"
[storage]
data_dir = "./data"

[resolver]
type = "remote"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(GateError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_chain_validates_both_sources() {
        let toml_content = r#"
[storage]
data_dir = "./data"

[resolver]
type = "chain"
table_path = "data/zip_centroids.txt"
endpoint = "https://api.zippopotam.us/us"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_out_of_range() {
        let toml_content = r#"
[storage]
data_dir = "./data"

[resolver]
type = "remote"
endpoint = "https://api.zippopotam.us/us"
timeout_ms = 0
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file_builds_table_resolver() {
        let mut table_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        table_file
            .write_all(b"zip,latitude,longitude\n10001,40.7484,-73.9967\n")
            .unwrap();

        let mut config_file = NamedTempFile::new().unwrap();
        let toml_content = format!(
            "[storage]\ndata_dir = \"./data\"\n\n[resolver]\ntype = \"table\"\ntable_path = \"{}\"\n",
            table_file.path().display().to_string().replace('\\', "/")
        );
        config_file.write_all(toml_content.as_bytes()).unwrap();

        let config = AppConfig::from_file(config_file.path()).unwrap();
        config.validate().unwrap();

        let resolver = config.build_resolver().unwrap();
        let zip = crate::domain::model::ZipCode::parse("10001").unwrap();
        let coordinate = tokio_test::block_on(resolver.resolve(&zip)).unwrap();
        assert_eq!(coordinate.latitude, 40.7484);
    }
}
