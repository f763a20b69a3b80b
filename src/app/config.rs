//! Application configuration.
//!
//! Loaded from `config.toml` in the platform configuration directory, or from
//! the path in `DFVPC_CONFIG`. A missing file yields the defaults.
//!
//! # config.toml Format
//!
//! ```toml
//! region = "us-west-2"
//! project_cache_ttl_secs = 60
//!
//! [credentials]
//! role_arn = "arn:aws:iam::123456789012:role/DeviceFarmAccess"
//!
//! [form]
//! trigger = "change"
//! mode = "refetch"
//! sync_subnets = true
//! sync_security_groups = true
//! lock_derived_fields = true
//! request_timeout = 30  # whole seconds, at least 1
//! ```

#![warn(clippy::all, rust_2018_idioms)]

use anyhow::{bail, Context, Result};
use aws_config::sts::AssumeRoleProvider;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_types::region::Region;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::vpc_form::FormOptions;

/// Device Farm is only offered in us-west-2
pub const DEFAULT_REGION: &str = "us-west-2";

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "DFVPC_CONFIG";

const SESSION_NAME: &str = "dfvpc";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub region: String,
    pub project_cache_ttl_secs: u64,
    pub credentials: CredentialSettings,
    pub form: FormOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            project_cache_ttl_secs: 60,
            credentials: CredentialSettings::default(),
            form: FormOptions::default(),
        }
    }
}

impl AppConfig {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        directories::ProjectDirs::from("com", "", "dfvpc")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            bail!("Region must not be empty");
        }

        let timeout = self.form.request_timeout;
        if timeout.is_zero() {
            bail!("form.request_timeout must be at least 1 second");
        }
        if timeout.subsec_nanos() != 0 {
            bail!(
                "form.request_timeout must be a whole number of seconds, got {:?}",
                timeout
            );
        }

        self.credentials.validate()
    }
}

/// How to authenticate against Device Farm.
///
/// Either a role ARN to assume, or an access key pair, or neither (the
/// default provider chain, optionally pinned to a named profile).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub role_arn: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub profile: Option<String>,
}

impl CredentialSettings {
    pub fn validate(&self) -> Result<()> {
        let role_arn = non_blank(&self.role_arn);
        let access_key_id = non_blank(&self.access_key_id);
        let secret_access_key = non_blank(&self.secret_access_key);

        match (role_arn, access_key_id, secret_access_key) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                bail!("Device Farm IAM role ARN *OR* access key id/secret access key must be set, not both")
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                bail!("Access key id and secret access key must be set together")
            }
            _ => Ok(()),
        }
    }

    /// Build the AWS SDK configuration these settings describe.
    pub async fn load_sdk_config(&self, region: &str) -> Result<aws_config::SdkConfig> {
        self.validate()?;
        let region = Region::new(region.to_string());

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region.clone());
        if let Some(profile) = non_blank(&self.profile) {
            loader = loader.profile_name(profile);
        }

        if let (Some(access_key_id), Some(secret_access_key)) = (
            non_blank(&self.access_key_id),
            non_blank(&self.secret_access_key),
        ) {
            debug!("Using static access keys for Device Farm");
            let credentials = Credentials::from_keys(access_key_id, secret_access_key, None);
            return Ok(loader.credentials_provider(credentials).load().await);
        }

        let base = loader.load().await;

        if let Some(role_arn) = non_blank(&self.role_arn) {
            debug!("Assuming role {} for Device Farm", role_arn);
            let provider = AssumeRoleProvider::builder(role_arn)
                .session_name(SESSION_NAME)
                .region(region.clone())
                .configure(&base)
                .build()
                .await;

            return Ok(aws_config::defaults(BehaviorVersion::latest())
                .region(region)
                .credentials_provider(provider)
                .load()
                .await);
        }

        debug!("Using default credential provider chain for Device Farm");
        Ok(base)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
