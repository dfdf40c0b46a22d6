//! Configuration for the settings page module

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix of environment variables overriding file values
pub const ENV_PREFIX: &str = "SETTINGS_PAGE_";

/// Placeholder nonce secret; the module refuses to start with it
pub const DEFAULT_NONCE_SECRET: &str = "change-me";

/// Settings page configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Heading of the page and title of the admin screen
    #[serde(default = "default_page_title")]
    pub page_title: String,

    /// Label of the admin menu entry
    #[serde(default = "default_menu_title")]
    pub menu_title: String,

    /// Capability required to see the page
    #[serde(default = "default_capability")]
    pub capability: String,

    /// Page slug, also the path the page is served under
    #[serde(default = "default_slug")]
    pub slug: String,

    /// Endpoint every section form posts to
    #[serde(default = "default_options_endpoint")]
    pub options_endpoint: String,

    /// Prefix of the CSS classes used by browse buttons, previews and separators
    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,

    /// Submit button label when a section sets none
    #[serde(default = "default_submit_label")]
    pub submit_label: String,

    /// Secret mixed into form nonces
    #[serde(default = "default_nonce_secret")]
    pub nonce_secret: String,

    /// Optional YAML schema document with sections and fields
    #[serde(default)]
    pub schema_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_title: default_page_title(),
            menu_title: default_menu_title(),
            capability: default_capability(),
            slug: default_slug(),
            options_endpoint: default_options_endpoint(),
            class_prefix: default_class_prefix(),
            submit_label: default_submit_label(),
            nonce_secret: default_nonce_secret(),
            schema_path: None,
        }
    }
}

impl Config {
    /// Defaults, overlaid by an optional YAML file, overlaid by `SETTINGS_PAGE_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }

    /// Reject configurations the module must not run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let secret = self.nonce_secret.trim();
        if secret.is_empty() || secret == DEFAULT_NONCE_SECRET {
            anyhow::bail!(
                "nonce_secret is unset; configure `nonce_secret` or {}NONCE_SECRET",
                ENV_PREFIX
            );
        }
        Ok(())
    }

    /// Path the page is served under
    pub fn page_path(&self) -> String {
        format!("/{}", self.slug.trim_start_matches('/'))
    }
}

fn default_page_title() -> String {
    "Settings".to_string()
}

fn default_menu_title() -> String {
    "Settings".to_string()
}

fn default_capability() -> String {
    "manage_options".to_string()
}

fn default_slug() -> String {
    "settings".to_string()
}

fn default_options_endpoint() -> String {
    "/options".to_string()
}

fn default_class_prefix() -> String {
    "settings-page".to_string()
}

fn default_submit_label() -> String {
    "Save Changes".to_string()
}

fn default_nonce_secret() -> String {
    DEFAULT_NONCE_SECRET.to_string()
}
