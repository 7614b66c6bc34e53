//! # Zuora client configuration
//!
//! This crate provides the configuration surface of the Zuora client:
//! - Loading configuration from a YAML file
//! - Merging with the embedded default configuration
//! - Environment variable overrides
//! - Typed getters and setters
//! - A [`ClientSettings`] snapshot consumed once by the client
//!
//! ## Usage
//!
//! ```no_run
//! use zuoraconfig::Config;
//!
//! let config = Config::load_config("")?;
//! config.set_sandbox(true)?;
//!
//! let settings = config.client_settings()?;
//! println!("logging in as {}", settings.username);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde::Deserialize;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tracing::{debug, info, warn};

const DEFAULT_CONFIG: &str = include_str!("zuora.yaml");

const ENV_CONFIG_DIR: &str = "ZUORA_CONFIG";
const ENV_PREFIX: &str = "ZUORA_CONFIG__";
const CONFIG_FILE: &str = "config.yaml";

/// Production endpoint of the SOAP API (WSDL a.63.0)
pub const PRODUCTION_ENDPOINT: &str = "https://www.zuora.com/apps/services/a/63.0";

/// Sandbox endpoint of the SOAP API (WSDL a.63.0)
pub const SANDBOX_ENDPOINT: &str = "https://apisandbox.zuora.com/apps/services/a/63.0";

const DEFAULT_SESSION_LIFETIME_SECS: u64 = 8 * 60 * 60;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<bool> {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for u64 values with default
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> Result<u64> {
            match self.get_value($path) {
                Ok(Value::Number(n)) => Ok(n.as_u64().unwrap_or($default)),
                Ok(Value::String(s)) => Ok(s.parse().unwrap_or($default)),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for optional string values
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr) => {
        pub fn $getter(&self) -> Result<Option<String>> {
            match self.get_value($path) {
                Ok(Value::String(s)) if !s.is_empty() => Ok(Some(s)),
                _ => Ok(None),
            }
        }

        pub fn $setter(&self, value: &str) -> Result<()> {
            self.set_value($path, Value::String(value.to_string()))
        }
    };
}

/// Configuration manager for the Zuora client
///
/// The configuration is a YAML tree. Keys are case-insensitive (stored
/// lower-cased). Values set through the setters are written back to
/// `config.yaml` when the configuration was loaded from a directory.
#[derive(Debug)]
pub struct Config {
    path: Option<PathBuf>,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            data: Mutex::new(self.snapshot()),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> PathBuf {
        if !directory.is_empty() {
            return PathBuf::from(directory);
        }

        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return PathBuf::from(env_path);
        }

        if Path::new(".zuora").exists() {
            return PathBuf::from(".zuora");
        }

        if let Some(home) = home_dir() {
            let home_config = home.join(".zuora");
            if home_config.exists() {
                return home_config;
            }
        }

        PathBuf::from(".zuora")
    }

    /// Loads the configuration
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `ZUORA_CONFIG` environment variable
    /// 3. `.zuora` in the current directory
    /// 4. `.zuora` in the user's home directory
    ///
    /// `config.yaml` in that directory is merged over the embedded default,
    /// then `ZUORA_CONFIG__SECTION__KEY` environment variables are applied.
    /// A missing file is not an error.
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::find_config_dir(directory);
        let path = config_dir.join(CONFIG_FILE);

        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        match fs::read(&path) {
            Ok(data) => {
                info!(config_file = %path.display(), "Loaded config file");
                let external: Value = serde_yaml::from_slice(&data)?;
                merge_yaml(&mut config_value, &Self::lower_keys_value(external));
            }
            Err(_) => {
                info!(config_file = %path.display(), "Config file not found, using embedded defaults");
            }
        }

        let mut config_value = Self::lower_keys_value(config_value);
        Self::apply_env_overrides(&mut config_value, env::vars());

        Ok(Config {
            path: Some(path),
            data: Mutex::new(config_value),
        })
    }

    /// Builds a configuration from YAML text merged over the embedded
    /// default, without reading files or the environment.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
        if !yaml.trim().is_empty() {
            let external: Value = serde_yaml::from_str(yaml)?;
            merge_yaml(&mut config_value, &Self::lower_keys_value(external));
        }

        Ok(Config {
            path: None,
            data: Mutex::new(Self::lower_keys_value(config_value)),
        })
    }

    /// Writes the current configuration to `config.yaml`
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(&self.snapshot())?;
        fs::write(path, yaml)?;
        debug!(config_file = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Path of the backing `config.yaml`, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys (e.g., `&["zuora", "sandbox"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                match map.get(Value::String(key.to_lowercase())) {
                    Some(next) => current = next,
                    None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Applies `ZUORA_CONFIG__*` variables; returns the ones that could not
    /// be applied.
    fn apply_env_overrides(
        config: &mut Value,
        vars: impl Iterator<Item = (String, String)>,
    ) -> Vec<String> {
        let mut rejected = Vec::new();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                debug!(variable = %key, "Applying environment override");
                if let Err(e) = Self::set_value_internal(config, &key_path, yaml_value) {
                    warn!(variable = %key, error = %e, "Ignoring environment override");
                    rejected.push(key);
                }
            }
        }
        rejected
    }

    fn convert_env_value(value: &str) -> Value {
        serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    let key = match k {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    new_map.insert(key, Self::lower_keys_value(v));
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    fn snapshot(&self) -> Value {
        match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    impl_string_config!(get_username, set_username, &["zuora", "username"]);
    impl_string_config!(get_password, set_password, &["zuora", "password"]);
    impl_string_config!(get_endpoint, set_endpoint, &["zuora", "endpoint"]);
    impl_bool_config!(get_sandbox, set_sandbox, &["zuora", "sandbox"], false);
    impl_bool_config!(
        get_reuse_authentication_token,
        set_reuse_authentication_token,
        &["zuora", "reuse_authentication_token"],
        true
    );
    impl_bool_config!(get_logging, set_logging, &["zuora", "logging"], false);
    impl_bool_config!(
        get_pretty_print_xml,
        set_pretty_print_xml,
        &["zuora", "pretty_print_xml"],
        false
    );
    impl_u64_config!(
        get_session_lifetime_secs,
        set_session_lifetime_secs,
        &["zuora", "session_lifetime_secs"],
        DEFAULT_SESSION_LIFETIME_SECS
    );
    impl_u64_config!(
        get_timeout_secs,
        set_timeout_secs,
        &["zuora", "timeout_secs"],
        DEFAULT_TIMEOUT_SECS
    );

    /// Immutable snapshot of the `zuora` section for one client.
    ///
    /// # Errors
    ///
    /// Fails when the username or password is missing.
    pub fn client_settings(&self) -> Result<ClientSettings> {
        let section = self.get_value(&["zuora"])?;
        let raw: RawSettings = serde_yaml::from_value(section)?;

        if raw.username.is_empty() {
            return Err(anyhow!("Zuora username is not configured (zuora.username)"));
        }
        if raw.password.is_empty() {
            return Err(anyhow!("Zuora password is not configured (zuora.password)"));
        }

        Ok(ClientSettings {
            username: raw.username,
            password: raw.password,
            sandbox: raw.sandbox,
            endpoint: Some(raw.endpoint).filter(|e| !e.is_empty()),
            reuse_authentication_token: raw.reuse_authentication_token,
            session_lifetime: Duration::from_secs(raw.session_lifetime_secs),
            timeout: Duration::from_secs(raw.timeout_secs),
            logging: raw.logging,
            pretty_print_xml: raw.pretty_print_xml,
        })
    }
}

/// On-disk shape of the `zuora` section
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSettings {
    username: String,
    password: String,
    sandbox: bool,
    endpoint: String,
    reuse_authentication_token: bool,
    session_lifetime_secs: u64,
    timeout_secs: u64,
    logging: bool,
    pretty_print_xml: bool,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            sandbox: false,
            endpoint: String::new(),
            reuse_authentication_token: true,
            session_lifetime_secs: DEFAULT_SESSION_LIFETIME_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            logging: false,
            pretty_print_xml: false,
        }
    }
}

/// Settings consumed by one client instance
#[derive(Clone)]
pub struct ClientSettings {
    pub username: String,
    pub password: String,
    /// Use the sandbox endpoint
    pub sandbox: bool,
    /// Explicit endpoint, takes precedence over `sandbox`
    pub endpoint: Option<String>,
    /// Reuse the session key across calls (read on every call)
    pub reuse_authentication_token: bool,
    /// Age after which a session is considered expired
    pub session_lifetime: Duration,
    /// HTTP timeout enforced by the transport
    pub timeout: Duration,
    /// Log outbound and inbound documents at debug level
    pub logging: bool,
    /// Indent logged documents
    pub pretty_print_xml: bool,
}

impl ClientSettings {
    /// Settings with default options for the given credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            sandbox: false,
            endpoint: None,
            reuse_authentication_token: true,
            session_lifetime: Duration::from_secs(DEFAULT_SESSION_LIFETIME_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            logging: false,
            pretty_print_xml: false,
        }
    }

    /// Endpoint selected by these settings
    pub fn endpoint(&self) -> &str {
        match &self.endpoint {
            Some(endpoint) => endpoint,
            None if self.sandbox => SANDBOX_ENDPOINT,
            None => PRODUCTION_ENDPOINT,
        }
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("username", &self.username)
            .field("password", &"***")
            .field("sandbox", &self.sandbox)
            .field("endpoint", &self.endpoint)
            .field("reuse_authentication_token", &self.reuse_authentication_token)
            .field("session_lifetime", &self.session_lifetime)
            .field("timeout", &self.timeout)
            .field("logging", &self.logging)
            .field("pretty_print_xml", &self.pretty_print_xml)
            .finish()
    }
}

/// Recursive merge: mappings are merged key by key, scalars and sequences
/// from `external` replace those in `default`.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(!config.get_sandbox().unwrap());
        assert!(config.get_reuse_authentication_token().unwrap());
        assert!(!config.get_logging().unwrap());
        assert_eq!(config.get_timeout_secs().unwrap(), 60);
        assert_eq!(config.get_username().unwrap(), None);
    }

    #[test]
    fn test_merge_keeps_unspecified_defaults() {
        let config = Config::from_yaml_str(
            "Zuora:\n  Username: api@example.com\n  password: secret\n  sandbox: true\n",
        )
        .unwrap();

        let settings = config.client_settings().unwrap();
        assert_eq!(settings.username, "api@example.com");
        assert_eq!(settings.password, "secret");
        assert!(settings.sandbox);
        assert!(settings.reuse_authentication_token);
        assert_eq!(settings.session_lifetime, Duration::from_secs(28800));
        assert_eq!(settings.endpoint(), SANDBOX_ENDPOINT);
    }

    #[test]
    fn test_missing_credentials_are_rejected() {
        let config = Config::from_yaml_str("zuora:\n  username: someone\n").unwrap();
        let err = config.client_settings().unwrap_err();
        assert!(err.to_string().contains("password"));
    }

    #[test]
    fn test_explicit_endpoint_wins() {
        let config = Config::from_yaml_str(
            "zuora:\n  username: u\n  password: p\n  sandbox: true\n  endpoint: http://localhost:9000/soap\n",
        )
        .unwrap();
        let settings = config.client_settings().unwrap();
        assert_eq!(settings.endpoint(), "http://localhost:9000/soap");
    }

    #[test]
    fn test_env_overrides() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let vars = vec![
            ("ZUORA_CONFIG__ZUORA__SANDBOX".to_string(), "true".to_string()),
            ("ZUORA_CONFIG__ZUORA__TIMEOUT_SECS".to_string(), "5".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ];
        let rejected = Config::apply_env_overrides(&mut value, vars.into_iter());
        assert!(rejected.is_empty());

        let timeout = Config::get_value_internal(&value, &["zuora", "timeout_secs"]).unwrap();
        assert_eq!(timeout, Value::Number(Number::from(5)));
        let sandbox = Config::get_value_internal(&value, &["zuora", "sandbox"]).unwrap();
        assert_eq!(sandbox, Value::Bool(true));
    }

    #[test]
    fn test_env_override_through_a_scalar_is_rejected() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        let vars = vec![
            ("ZUORA_CONFIG__ZUORA__USERNAME__FIRST".to_string(), "x".to_string()),
            ("ZUORA_CONFIG__ZUORA__LOGGING".to_string(), "true".to_string()),
        ];
        let rejected = Config::apply_env_overrides(&mut value, vars.into_iter());

        assert_eq!(rejected, vec!["ZUORA_CONFIG__ZUORA__USERNAME__FIRST"]);
        let username = Config::get_value_internal(&value, &["zuora", "username"]).unwrap();
        assert_eq!(username, Value::String(String::new()));
        let logging = Config::get_value_internal(&value, &["zuora", "logging"]).unwrap();
        assert_eq!(logging, Value::Bool(true));
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "zuora:\n  username: file-user\n  password: file-pass\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.get_username().unwrap().as_deref(), Some("file-user"));

        config.set_logging(true).unwrap();
        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert!(reloaded.get_logging().unwrap());
    }

    #[test]
    fn test_settings_debug_hides_password() {
        let settings = ClientSettings::new("user", "hunter2");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("hunter2"));
    }
}
