//! SeaORM option store and module wiring against in-memory SQLite

use serde_json::json;
use settings_page::contract::{OptionRecord, SettingsPageApi};
use settings_page::domain::OptionStore;
use settings_page::infra::SeaOrmOptionStore;
use settings_page::{LifecycleEvent, LifecycleOutput, SettingsPageModule};
use std::io::Write;
use std::sync::Arc;

mod common;
use common::*;

async fn connect() -> Arc<sea_orm::DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    SettingsPageModule::migrate(&db).await.unwrap();
    Arc::new(db)
}

#[tokio::test]
async fn test_sea_orm_store_round_trip() {
    print_test_header(
        "test_sea_orm_store_round_trip",
        "Records are created once, replaced on update and read back in order",
    );
    let store = SeaOrmOptionStore::new(connect().await);

    assert!(!store.exists("general").await.unwrap());
    assert_eq!(store.read("general").await.unwrap(), None);

    store.create("general").await.unwrap();
    store.create("general").await.unwrap();
    assert_eq!(store.read("general").await.unwrap(), Some(OptionRecord::new()));

    let first = record(json!({"site_name": "Acme", "days": {"mon": true}}));
    store.update("general", &first).await.unwrap();
    assert_eq!(store.read("general").await.unwrap(), Some(first));

    let second = record(json!({"site_name": "Other"}));
    store.update("general", &second).await.unwrap();
    store.update("advanced", &second).await.unwrap();
    assert_eq!(store.read("general").await.unwrap(), Some(second.clone()));
    assert_eq!(store.read("advanced").await.unwrap(), Some(second));
}

#[tokio::test]
async fn test_module_lifecycle_with_database() {
    print_test_header(
        "test_module_lifecycle_with_database",
        "Scripts, registration and menu come from the lifecycle events",
    );
    let mut schema_file = tempfile::NamedTempFile::new().unwrap();
    schema_file.write_all(DEMO_SCHEMA.as_bytes()).unwrap();

    let config = settings_page::Config {
        page_title: "Demo Settings".to_string(),
        menu_title: "Demo".to_string(),
        slug: "demo".to_string(),
        schema_path: Some(schema_file.path().to_path_buf()),
        ..test_config()
    };

    let module = SettingsPageModule::default();
    module.init_with_db(config, connect().await).await.unwrap();

    let LifecycleOutput::Scripts(scripts) = module.handle(LifecycleEvent::AdminEnqueueScripts).await.unwrap() else {
        panic!("expected scripts");
    };
    let iris = scripts.iter().find(|s| s.handle == "iris").unwrap();
    assert!(iris.in_footer);
    assert_eq!(iris.deps.len(), 3);

    let LifecycleOutput::Registered(first) = module.handle(LifecycleEvent::AdminInit).await.unwrap() else {
        panic!("expected registry");
    };
    let second = module.admin_init().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.sections.len(), 2);

    let LifecycleOutput::Menu(menu) = module.handle(LifecycleEvent::AdminMenu).await.unwrap() else {
        panic!("expected menu");
    };
    assert_eq!(menu.page_title, "Demo Settings");
    assert_eq!(menu.menu_title, "Demo");
    assert_eq!(menu.capability, "manage_options");
    assert_eq!(menu.slug, "demo");

    let client = module.client().unwrap();
    client
        .save_section("general", record(json!({"enabled": "on"})))
        .await
        .unwrap();
    assert_eq!(client.get_value("general", "enabled").await.unwrap(), json!("on"));
    assert_eq!(client.get_value("general", "site_name").await.unwrap(), json!("My Site"));

    let page = client.render_page(Some("advanced".to_string())).await.unwrap();
    assert!(page.contains("<h1>Demo Settings</h1>"));
    assert!(page.contains(r#"<input type="hidden" name="_http_referer" value="/demo" />"#));
}

#[tokio::test]
async fn test_uninitialized_module_reports_error() {
    let module = SettingsPageModule::default();

    assert!(module.client().is_err());
    assert!(module.handle(LifecycleEvent::AdminInit).await.is_err());
    assert_eq!(module.admin_menu().capability, "manage_options");
}

#[tokio::test]
async fn test_module_refuses_placeholder_nonce_secret() {
    print_test_header(
        "test_module_refuses_placeholder_nonce_secret",
        "Init fails until a real nonce secret is configured",
    );
    let module = SettingsPageModule::default();

    let err = module.init_in_memory(settings_page::Config::default()).unwrap_err();
    assert!(format!("{:#}", err).contains("nonce_secret"));
    assert!(module.service().is_err());

    let err = module
        .init_with_db(settings_page::Config::default(), connect().await)
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("nonce_secret"));

    module.init_in_memory(test_config()).unwrap();
    assert!(module.service().is_ok());
}
