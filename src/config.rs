use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error};

use crate::types::Config;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_SSM_PATH: &str = "/applications/runscope2slack";
pub const DEFAULT_PROJECT: &str = "GBDX";
pub const DEFAULT_RUNSCOPE_API_URL: &str = "https://api.runscope.com";
pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[derive(Debug, Error)]
pub enum ParameterStoreError {
    #[error("parameter not found")]
    NotFound,
    #[error("parameter store unavailable: {0}")]
    Unavailable(String),
}

/// Remote key-value store consulted for settings missing from the environment.
#[async_trait]
pub trait ParameterStore {
    async fn get_parameter(&self, path: &str) -> Result<String, ParameterStoreError>;
}

/// AWS SSM Parameter Store, always requesting decryption of secure strings.
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub async fn new(region: &str) -> Self {
        let sdk_config = aws_config::from_env()
            .region(aws_sdk_ssm::config::Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_ssm::Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, path: &str) -> Result<String, ParameterStoreError> {
        let output = self
            .client
            .get_parameter()
            .name(path)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetParameterError::ParameterNotFound(_) => ParameterStoreError::NotFound,
                other => ParameterStoreError::Unavailable(other.to_string()),
            })?;
        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or(ParameterStoreError::NotFound)
    }
}

/// In-memory store for tests
#[derive(Debug, Default)]
pub struct MockParameterStore {
    params: HashMap<String, String>,
    unavailable: Option<String>,
}

impl MockParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter<K, V>(mut self, path: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params.insert(path.into(), value.into());
        self
    }

    /// Every lookup fails with `ParameterStoreError::Unavailable`.
    pub fn unavailable<M: Into<String>>(mut self, message: M) -> Self {
        self.unavailable = Some(message.into());
        self
    }
}

#[async_trait]
impl ParameterStore for MockParameterStore {
    async fn get_parameter(&self, path: &str) -> Result<String, ParameterStoreError> {
        if let Some(message) = &self.unavailable {
            return Err(ParameterStoreError::Unavailable(message.clone()));
        }
        self.params
            .get(path)
            .cloned()
            .ok_or(ParameterStoreError::NotFound)
    }
}

/// Looks a setting up in the environment first, then under `{base_path}/{name}` in the store.
pub struct SettingsResolver<'a, E: EnvironmentProvider, P: ParameterStore> {
    env: &'a E,
    store: &'a P,
    base_path: String,
}

impl<'a, E: EnvironmentProvider, P: ParameterStore> SettingsResolver<'a, E, P> {
    pub fn new(env: &'a E, store: &'a P, base_path: &str) -> Self {
        Self {
            env,
            store,
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn parameter_path(&self, name: &str) -> String {
        format!("{}/{}", self.base_path, name)
    }

    /// `Ok(None)` when neither source knows the setting; `Err` when the store itself failed.
    pub async fn resolve(&self, name: &str) -> Result<Option<String>, ParameterStoreError> {
        if let Some(value) = self.env.get_var(name) {
            return Ok(Some(value));
        }
        let path = self.parameter_path(name);
        debug!("{} not in environment, reading {}", name, path);
        match self.store.get_parameter(&path).await {
            Ok(value) => Ok(Some(value.trim_end_matches('/').to_string())),
            Err(ParameterStoreError::NotFound) => {
                error!(
                    "Parameter {} must be set in parameter store, or through environment variable",
                    name
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

pub fn ssm_path<E: EnvironmentProvider>(env: &E) -> String {
    env.get_var("SSM_PATH")
        .unwrap_or_else(|| DEFAULT_SSM_PATH.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub fn region<E: EnvironmentProvider>(env: &E) -> String {
    env.get_var("REGION")
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

pub async fn load_config() -> Result<Config> {
    let env = SystemEnvironment;
    let store = SsmParameterStore::new(&region(&env)).await;
    load_config_with(&env, &store).await
}

pub async fn load_config_with<E, P>(env: &E, store: &P) -> Result<Config>
where
    E: EnvironmentProvider,
    P: ParameterStore,
{
    let ssm_path = ssm_path(env);
    let resolver = SettingsResolver::new(env, store, &ssm_path);

    let mut missing: Vec<&str> = Vec::new();
    let mut settings: HashMap<&str, String> = HashMap::new();
    for name in ["RUNSCOPE_APIKEY", "RUNSCOPE_BUCKET", "SLACK_TOKEN", "SLACK_CHANNEL"] {
        match resolver.resolve(name).await? {
            Some(value) => {
                settings.insert(name, value);
            }
            None => missing.push(name),
        }
    }
    if !missing.is_empty() {
        return Err(anyhow!("missing required settings: {}", missing.join(", ")));
    }
    let mut take = |name: &str| settings.remove(name).unwrap_or_default();

    let output_dir = env
        .get_var("OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);

    Ok(Config {
        runscope_apikey: take("RUNSCOPE_APIKEY"),
        runscope_bucket: take("RUNSCOPE_BUCKET"),
        slack_token: take("SLACK_TOKEN"),
        slack_channel: take("SLACK_CHANNEL"),
        project: env.get_var("PROJECT").unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
        runscope_api_url: env
            .get_var("RUNSCOPE_API_URL")
            .unwrap_or_else(|| DEFAULT_RUNSCOPE_API_URL.to_string())
            .trim_end_matches('/')
            .to_string(),
        slack_api_url: env
            .get_var("SLACK_API_URL")
            .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string())
            .trim_end_matches('/')
            .to_string(),
        output_dir,
    })
}
