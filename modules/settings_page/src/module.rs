//! Module declaration and lifecycle implementation
//!
//! The host dispatches three admin events to the module: script enqueueing,
//! admin init (registration pass) and menu building.

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::{MenuPage, Registry, ScriptAsset, SettingsPageApi};
use crate::domain::schema::{FrozenSchema, SchemaRegistry};
use crate::domain::{OptionStore, Service};
use crate::infra::{HmacNonceProvider, InMemoryOptionStore, SeaOrmOptionStore};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::path::Path;
use std::sync::Arc;

/// Host admin lifecycle events the module reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    AdminEnqueueScripts,
    AdminInit,
    AdminMenu,
}

/// What the module hands back for each lifecycle event
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleOutput {
    Scripts(Vec<ScriptAsset>),
    Registered(Registry),
    Menu(MenuPage),
}

/// Settings page module
pub struct SettingsPageModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for SettingsPageModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            service: RwLock::new(None),
        }
    }
}

impl SettingsPageModule {
    /// Wire the module with an explicit schema and option store
    pub fn init(&self, config: Config, schema: FrozenSchema, store: Arc<dyn OptionStore>) -> Result<()> {
        config.validate().context("invalid settings page configuration")?;
        let nonces = Arc::new(HmacNonceProvider::new(config.nonce_secret.clone()));
        let service = Arc::new(Service::new(Arc::new(schema), store, nonces, config.clone()));

        *self.config.write() = config;
        *self.service.write() = Some(service);
        tracing::info!("Settings page module initialized");
        Ok(())
    }

    /// Wire the module from configuration with an in-memory option store
    pub fn init_in_memory(&self, config: Config) -> Result<()> {
        let schema = load_configured_schema(&config)?;
        self.init(config, schema, Arc::new(InMemoryOptionStore::new()))
    }

    /// Wire the module from configuration, persisting records in the database
    pub async fn init_with_db(&self, config: Config, db: Arc<DatabaseConnection>) -> Result<()> {
        config.validate().context("invalid settings page configuration")?;
        let schema = load_configured_schema(&config)?;
        Self::migrate(&db).await?;
        self.init(config, schema, Arc::new(SeaOrmOptionStore::new(db)))
    }

    /// Run database migrations for the options table
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Settings page migrations completed");
        Ok(())
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// Native client for in-process callers
    pub fn client(&self) -> Result<Arc<dyn SettingsPageApi>> {
        Ok(Arc::new(NativeClient::new(self.service()?)))
    }

    // ===== Lifecycle =====

    /// Dispatch one lifecycle event
    pub async fn handle(&self, event: LifecycleEvent) -> Result<LifecycleOutput> {
        tracing::debug!("Settings page lifecycle event: {:?}", event);
        Ok(match event {
            LifecycleEvent::AdminEnqueueScripts => LifecycleOutput::Scripts(self.admin_scripts()),
            LifecycleEvent::AdminInit => LifecycleOutput::Registered(self.admin_init().await?),
            LifecycleEvent::AdminMenu => LifecycleOutput::Menu(self.admin_menu()),
        })
    }

    /// Assets the page script depends on
    pub fn admin_scripts(&self) -> Vec<ScriptAsset> {
        vec![
            ScriptAsset {
                handle: "jquery".to_string(),
                src: None,
                deps: Vec::new(),
                in_footer: false,
            },
            ScriptAsset {
                handle: "iris".to_string(),
                src: Some("js/iris.min.js".to_string()),
                deps: vec![
                    "jquery-ui-draggable".to_string(),
                    "jquery-ui-slider".to_string(),
                    "jquery-touch-punch".to_string(),
                ],
                in_footer: true,
            },
            ScriptAsset {
                handle: "media-editor".to_string(),
                src: None,
                deps: vec!["jquery".to_string()],
                in_footer: false,
            },
        ]
    }

    /// Run the registration pass; repeated calls return the first result
    pub async fn admin_init(&self) -> Result<Registry> {
        let service = self.service()?;
        Ok(service.register().await.clone())
    }

    /// Options menu entry for the page
    pub fn admin_menu(&self) -> MenuPage {
        let config = self.config.read();
        MenuPage {
            page_title: config.page_title.clone(),
            menu_title: config.menu_title.clone(),
            capability: config.capability.clone(),
            slug: config.slug.clone(),
        }
    }

    // ===== REST =====

    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;

        tracing::info!("Registering settings page REST routes");
        crate::api::rest::routes::register_routes(router, service)
    }
}

/// Schema from the configured YAML document, empty when none is configured
fn load_configured_schema(config: &Config) -> Result<FrozenSchema> {
    match &config.schema_path {
        Some(path) => load_schema_file(path),
        None => Ok(SchemaRegistry::new().freeze()),
    }
}

/// Load and freeze a YAML schema document
pub fn load_schema_file(path: &Path) -> Result<FrozenSchema> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;

    let mut registry = SchemaRegistry::new();
    registry
        .load_yaml(&source)
        .with_context(|| format!("invalid schema file {}", path.display()))?;
    Ok(registry.freeze())
}
