//! Service registry locating the provider client and news storage.
//!
//! Request handlers receive an `Arc<dyn ServiceRegistry>` from the
//! composition root. [`RegistrySlot`] keeps the configure-once contract for
//! roots that prefer a process-wide locator (see [`configure_global`]).

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::error::{ConfigurationError, Result};
use crate::news::{CatalogNewsStorage, FakeNewsStorage, NewsStorage};
use crate::provider::{FakeLinkedInClient, ProviderClient, RestLinkedInClient};

/// Locator for the external services the authorization flow talks to.
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// The configured LinkedIn client (real or fake).
    async fn linkedin(&self) -> Result<Arc<dyn ProviderClient>>;

    async fn news_storage(&self) -> Result<Arc<dyn NewsStorage>>;
}

/// Registry that builds its services from [`ServiceConfig`] on first use.
///
/// Each service is constructed at most once, even when several requests race
/// for it; later calls share the same instance.
///
/// # Example
/// ```no_run
/// use newstler::config::ServiceConfig;
/// use newstler::registry::{ConfigDrivenRegistry, ServiceRegistry};
///
/// # async fn example() -> newstler::error::Result<()> {
/// let registry = ConfigDrivenRegistry::new(ServiceConfig::load(None)?)?;
/// let linkedin = registry.linkedin().await?;
/// println!("{}", linkedin.build_authorization_request().authorization_url);
/// # Ok(())
/// # }
/// ```
pub struct ConfigDrivenRegistry {
    config: Arc<ServiceConfig>,
    linkedin: OnceCell<Arc<dyn ProviderClient>>,
    news_storage: OnceCell<Arc<dyn NewsStorage>>,
}

impl ConfigDrivenRegistry {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            linkedin: OnceCell::new(),
            news_storage: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn build_linkedin(&self) -> Result<Arc<dyn ProviderClient>> {
        if self.config.linkedin.disabled {
            info!("linkedin disabled; using fake client");
            return Ok(Arc::new(FakeLinkedInClient::new()?));
        }
        let settings = self.config.linkedin.settings()?;
        let client = RestLinkedInClient::new(settings)?;
        info!(base_url = %client.settings().base_url, "linkedin client constructed");
        Ok(Arc::new(client))
    }

    fn build_news_storage(&self) -> Result<Arc<dyn NewsStorage>> {
        if let Some(path) = &self.config.storage.news_catalog {
            return Ok(Arc::new(CatalogNewsStorage::load(path)?));
        }
        if self.config.linkedin.disabled {
            return Ok(Arc::new(FakeNewsStorage));
        }
        warn!("no news catalog configured; feed will be empty");
        Ok(Arc::new(CatalogNewsStorage::default()))
    }
}

#[async_trait]
impl ServiceRegistry for ConfigDrivenRegistry {
    async fn linkedin(&self) -> Result<Arc<dyn ProviderClient>> {
        self.linkedin
            .get_or_try_init(|| async { self.build_linkedin() })
            .await
            .map(Arc::clone)
    }

    async fn news_storage(&self) -> Result<Arc<dyn NewsStorage>> {
        self.news_storage
            .get_or_try_init(|| async { self.build_news_storage() })
            .await
            .map(Arc::clone)
    }
}

/// Registry over instances wired by hand.
#[derive(Clone)]
pub struct StaticRegistry {
    linkedin: Arc<dyn ProviderClient>,
    news_storage: Arc<dyn NewsStorage>,
}

impl StaticRegistry {
    pub fn new(linkedin: Arc<dyn ProviderClient>, news_storage: Arc<dyn NewsStorage>) -> Self {
        Self {
            linkedin,
            news_storage,
        }
    }
}

#[async_trait]
impl ServiceRegistry for StaticRegistry {
    async fn linkedin(&self) -> Result<Arc<dyn ProviderClient>> {
        Ok(self.linkedin.clone())
    }

    async fn news_storage(&self) -> Result<Arc<dyn NewsStorage>> {
        Ok(self.news_storage.clone())
    }
}

/// Single-assignment holder for a registry.
pub struct RegistrySlot {
    instance: OnceLock<Arc<dyn ServiceRegistry>>,
}

impl RegistrySlot {
    pub const fn new() -> Self {
        Self {
            instance: OnceLock::new(),
        }
    }

    /// Install `registry`. Fails if the slot was already configured; the
    /// existing registry is kept.
    pub fn configure(&self, registry: Arc<dyn ServiceRegistry>) -> Result<()> {
        self.instance
            .set(registry)
            .map_err(|_| ConfigurationError::AlreadyConfigured.into())
    }

    pub fn get(&self) -> Result<Arc<dyn ServiceRegistry>> {
        self.instance
            .get()
            .cloned()
            .ok_or_else(|| ConfigurationError::NotConfigured.into())
    }
}

impl Default for RegistrySlot {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_REGISTRY: RegistrySlot = RegistrySlot::new();

/// Install the process-wide registry. May succeed only once per process.
pub fn configure_global(registry: Arc<dyn ServiceRegistry>) -> Result<()> {
    GLOBAL_REGISTRY.configure(registry)
}

/// The process-wide registry installed by [`configure_global`].
pub fn global() -> Result<Arc<dyn ServiceRegistry>> {
    GLOBAL_REGISTRY.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NewstlerError;

    fn fake_config() -> ServiceConfig {
        ServiceConfig::from_toml_str("[linkedin]\ndisabled = true\n").unwrap()
    }

    fn same_instance<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
        std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
    }

    #[test]
    fn slot_get_before_configure_fails() {
        let slot = RegistrySlot::new();
        assert!(matches!(
            slot.get(),
            Err(NewstlerError::Configuration(ConfigurationError::NotConfigured))
        ));
    }

    #[test]
    fn slot_configures_once() {
        let slot = RegistrySlot::new();
        let first: Arc<dyn ServiceRegistry> =
            Arc::new(ConfigDrivenRegistry::new(fake_config()).unwrap());
        let second: Arc<dyn ServiceRegistry> =
            Arc::new(ConfigDrivenRegistry::new(fake_config()).unwrap());

        slot.configure(first.clone()).unwrap();
        assert!(matches!(
            slot.configure(second),
            Err(NewstlerError::Configuration(ConfigurationError::AlreadyConfigured))
        ));
        assert!(same_instance(&slot.get().unwrap(), &first));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let result = ConfigDrivenRegistry::new(ServiceConfig::default());
        assert!(matches!(
            result,
            Err(NewstlerError::Configuration(ConfigurationError::MissingKey { .. }))
        ));
    }

    #[tokio::test]
    async fn disabled_flag_selects_fake_services() {
        let registry = ConfigDrivenRegistry::new(fake_config()).unwrap();
        let linkedin = registry.linkedin().await.unwrap();
        assert_eq!(linkedin.provider_name(), "linkedin-fake");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_shares_one_instance() {
        let registry = Arc::new(ConfigDrivenRegistry::new(fake_config()).unwrap());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                (
                    registry.linkedin().await.unwrap(),
                    registry.news_storage().await.unwrap(),
                )
            }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        let (first_client, first_storage) = &results[0];
        for (client, storage) in &results[1..] {
            assert!(same_instance(client, first_client));
            assert!(same_instance(storage, first_storage));
        }
    }
}
