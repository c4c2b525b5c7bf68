use crate::adapters::storage::read_optional;
use crate::domain::model::{Radius, ServiceAreaConfig, ServiceAreaEntry, ZipCode};
use crate::domain::ports::Storage;
use crate::utils::error::{GateError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_SERVICE_AREAS_FILE: &str = "service_areas.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ServiceAreaFile {
    #[serde(default)]
    areas: Vec<ServiceAreaEntry>,
}

/// Admin-managed service areas, persisted as TOML:
///
/// ```toml
/// [[areas]]
/// zip = "10001"
/// radius_miles = 20
/// ```
///
/// Admin edits through clones of one store are applied one at a time.
#[derive(Debug, Clone)]
pub struct ServiceAreaStore<S: Storage> {
    storage: S,
    path: String,
    write_lock: Arc<Mutex<()>>,
}

impl<S: Storage> ServiceAreaStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 讀取目前的設定快照；檔案不存在視為空設定
    pub async fn load(&self) -> Result<ServiceAreaConfig> {
        let Some(data) = read_optional(&self.storage, &self.path).await? else {
            tracing::debug!("{} not found, using empty service-area config", self.path);
            return Ok(ServiceAreaConfig::new());
        };

        let content = String::from_utf8_lossy(&data);
        let file: ServiceAreaFile =
            toml::from_str(&content).map_err(|e| GateError::ConfigValidationError {
                field: self.path.clone(),
                message: format!("TOML parsing error: {}", e),
            })?;

        let config = ServiceAreaConfig::from_entries(file.areas);
        tracing::debug!("Loaded {} service areas from {}", config.len(), self.path);
        Ok(config)
    }

    pub async fn save(&self, config: &ServiceAreaConfig) -> Result<()> {
        let file = ServiceAreaFile {
            areas: config.entries().collect(),
        };
        let content = toml::to_string(&file).map_err(|e| GateError::ConfigError {
            message: format!("Failed to serialize service areas: {}", e),
        })?;
        self.storage.write_file(&self.path, content.as_bytes()).await
    }

    /// Adds the ZIP, or replaces its radius when it is already configured.
    pub async fn upsert(&self, zip: &str, radius: Radius) -> Result<ServiceAreaEntry> {
        let entry = ServiceAreaEntry::new(ZipCode::parse(zip.trim())?, radius);
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        config.set(entry.clone());
        self.save(&config).await?;

        tracing::info!("ZIP {} added/updated with {} miles", entry.zip_code, radius);
        Ok(entry)
    }

    pub async fn update_radius(&self, zip: &str, radius: Radius) -> Result<ServiceAreaEntry> {
        let zip_code = ZipCode::parse(zip.trim())?;
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        if config.get(&zip_code).is_none() {
            return Err(GateError::ConfigError {
                message: format!("ZIP {} is not a configured service area", zip_code),
            });
        }

        let entry = ServiceAreaEntry::new(zip_code, radius);
        config.set(entry.clone());
        self.save(&config).await?;

        tracing::info!("ZIP {} radius updated to {} miles", entry.zip_code, radius);
        Ok(entry)
    }

    /// Returns whether the ZIP was configured.
    pub async fn remove(&self, zip: &str) -> Result<bool> {
        let zip_code = ZipCode::parse(zip.trim())?;
        let _guard = self.write_lock.lock().await;
        let mut config = self.load().await?;
        let removed = config.remove(&zip_code).is_some();
        if removed {
            self.save(&config).await?;
            tracing::info!("ZIP {} removed", zip_code);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ServiceAreaStore<LocalStorage> {
        ServiceAreaStore::new(LocalStorage::new(dir.path()), DEFAULT_SERVICE_AREAS_FILE)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_update_remove() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.upsert("10001", Radius::Twenty).await.unwrap();
        store.upsert(" 07001 ", Radius::Forty).await.unwrap();
        store.upsert("10001", Radius::Sixty).await.unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.len(), 2);
        assert_eq!(
            config.get(&ZipCode::parse("10001").unwrap()),
            Some(Radius::Sixty)
        );

        store.update_radius("07001", Radius::Eighty).await.unwrap();
        assert!(store.update_radius("85379", Radius::Twenty).await.is_err());

        assert!(store.remove("10001").await.unwrap());
        assert!(!store.remove("10001").await.unwrap());

        let config = store.load().await.unwrap();
        let entries: Vec<ServiceAreaEntry> = config.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].zip_code.as_str(), "07001");
        assert_eq!(entries[0].radius_miles, Radius::Eighty);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_all_persist() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut handles = Vec::new();
        for i in 0..12u32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert(&format!("{:05}", 85300 + i), Radius::Forty).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let config = store.load().await.unwrap();
        assert_eq!(config.len(), 12);
        assert!(config.entries().all(|e| e.radius_miles == Radius::Forty));
    }

    #[tokio::test]
    async fn test_invalid_zip_not_persisted() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = store.upsert("1234", Radius::Twenty).await.unwrap_err();
        assert!(matches!(err, GateError::InvalidZip { .. }));
        assert!(!dir.path().join(DEFAULT_SERVICE_AREAS_FILE).exists());
    }

    #[tokio::test]
    async fn test_hand_edited_duplicates_keep_larger_radius() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_SERVICE_AREAS_FILE),
            r#"
[[areas]]
zip = "85379"
radius_miles = 20

[[areas]]
zip = "85379"
radius_miles = 60
"#,
        )
        .unwrap();

        let config = store(&dir).load().await.unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(
            config.get(&ZipCode::parse("85379").unwrap()),
            Some(Radius::Sixty)
        );
    }

    #[tokio::test]
    async fn test_disallowed_radius_in_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_SERVICE_AREAS_FILE),
            "[[areas]]\nzip = \"85379\"\nradius_miles = 15\n",
        )
        .unwrap();

        let err = store(&dir).load().await.unwrap_err();
        assert!(matches!(err, GateError::ConfigValidationError { .. }));
    }
}
