//! Common test utilities and a shared demo schema

#![allow(dead_code)]

use async_trait::async_trait;
use settings_page::config::Config;
use settings_page::contract::OptionRecord;
use settings_page::domain::{NonceProvider, OptionStore, SchemaRegistry, Service};
use settings_page::infra::{HmacNonceProvider, InMemoryOptionStore};
use settings_page::FrozenSchema;
use std::collections::HashSet;
use std::sync::Arc;

/// Demo page: a general tab and an advanced tab
pub const DEMO_SCHEMA: &str = r#"
sections:
  - id: general
    title: General
    desc: Basic site options
  - id: advanced
    title: Advanced
    label_submit: Apply
fields:
  general:
    - id: site_name
      name: Site name
      type: text
      default: My Site
      placeholder: Enter a name
    - id: enabled
      name: Enabled
      type: checkbox
      desc: Turn the feature on
    - id: days
      name: Days
      type: multicheck
      options:
        mon: Monday
        tue: Tuesday
    - id: homepage
      name: Homepage
      type: url
  advanced:
    - id: level
      name: Level
      type: number
      default: "1"
    - id: divider
      type: separator
    - id: notes
      name: Notes
      type: textarea
"#;

pub const NONCE_SECRET: &str = "test-secret";

pub fn print_test_header(test_name: &str, purpose: &str) {
    init_tracing();
    println!("\n🧪 TEST: {}", test_name);
    println!("📋 PURPOSE: {}", purpose);
}

/// Route `tracing` output through the test harness, `RUST_LOG` filtered
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn demo_schema() -> FrozenSchema {
    let mut registry = SchemaRegistry::new();
    registry.load_yaml(DEMO_SCHEMA).unwrap();
    registry.freeze()
}

pub fn test_config() -> Config {
    Config {
        nonce_secret: NONCE_SECRET.to_string(),
        ..Config::default()
    }
}

pub fn nonces() -> HmacNonceProvider {
    HmacNonceProvider::new(NONCE_SECRET)
}

/// Form token the rendered page would carry for a section
pub fn nonce_for(section: &str) -> String {
    nonces().create(&format!("{}-options", section))
}

pub fn build_service(store: Arc<dyn OptionStore>) -> Service {
    Service::new(Arc::new(demo_schema()), store, Arc::new(nonces()), test_config())
}

pub fn in_memory_service() -> (Arc<Service>, Arc<InMemoryOptionStore>) {
    let store = Arc::new(InMemoryOptionStore::new());
    (Arc::new(build_service(store.clone())), store)
}

pub fn record(value: serde_json::Value) -> OptionRecord {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {}", other),
    }
}

/// Store whose writes fail for selected option names
pub struct FlakyStore {
    inner: InMemoryOptionStore,
    failing: HashSet<String>,
}

impl FlakyStore {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            inner: InMemoryOptionStore::new(),
            failing: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn check(&self, name: &str) -> anyhow::Result<()> {
        if self.failing.contains(name) {
            anyhow::bail!("option {} is unavailable", name);
        }
        Ok(())
    }
}

#[async_trait]
impl OptionStore for FlakyStore {
    async fn read(&self, name: &str) -> anyhow::Result<Option<OptionRecord>> {
        self.inner.read(name).await
    }

    async fn exists(&self, name: &str) -> anyhow::Result<bool> {
        self.inner.exists(name).await
    }

    async fn create(&self, name: &str) -> anyhow::Result<()> {
        self.check(name)?;
        self.inner.create(name).await
    }

    async fn update(&self, name: &str, record: &OptionRecord) -> anyhow::Result<()> {
        self.check(name)?;
        self.inner.update(name, record).await
    }
}
