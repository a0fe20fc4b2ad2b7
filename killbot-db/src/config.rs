//! Database connection settings.
//!
//! Values come from `KILLBOT_DB_*` environment variables, then the
//! `[database]` table of `~/.config/killbot/database.toml`, then defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const ENV_BACKEND: &str = "KILLBOT_DB_BACKEND";
pub const ENV_HOST: &str = "KILLBOT_DB_HOST";
pub const ENV_USER: &str = "KILLBOT_DB_USER";
pub const ENV_PASSWORD: &str = "KILLBOT_DB_PASSWORD";
pub const ENV_SCHEMA: &str = "KILLBOT_DB_SCHEMA";
pub const ENV_PATH: &str = "KILLBOT_DB_PATH";

pub const DEFAULT_HOST: &str = "localhost:3306";
pub const DEFAULT_SCHEMA: &str = "killbot";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Which driver the store connects through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    #[default]
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "sqlite")]
    Sqlite,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(StoreError::config(format!(
                "Unknown database backend '{}' (expected mysql or sqlite)",
                other
            ))),
        }
    }
}

/// Everything needed to open a connection.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub backend: Backend,
    /// `host` or `host:port`; MySQL only.
    pub host: String,
    pub user: String,
    pub password: String,
    /// Database (schema) name; MySQL only.
    pub schema: String,
    /// Database file, or `:memory:`; SQLite only.
    pub path: Option<PathBuf>,
}

// Hand-written so the password never ends up in logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"****")
            .field("schema", &self.schema)
            .field("path", &self.path)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::MySql,
            host: DEFAULT_HOST.to_string(),
            user: String::new(),
            password: String::new(),
            schema: DEFAULT_SCHEMA.to_string(),
            path: None,
        }
    }
}

/// TOML config file format.
#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    database: Option<DatabaseSection>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct DatabaseSection {
    backend: Option<String>,
    host: Option<String>,
    user: Option<String>,
    password: Option<String>,
    schema: Option<String>,
    path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn mysql(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            backend: Backend::MySql,
            host: host.into(),
            user: user.into(),
            password: password.into(),
            schema: schema.into(),
            path: None,
        }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Sqlite,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Load settings from the environment and the config file.
    ///
    /// Priority: env vars > config file > defaults.
    pub fn load() -> Result<Self, StoreError> {
        let config = Self::load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but missing required fields are left empty.
    pub fn load_unvalidated() -> Result<Self, StoreError> {
        let content = read_config_file()?;
        Self::merge_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve settings from config file text and an environment lookup.
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::merge_sources(file, env)?;
        config.validate()?;
        Ok(config)
    }

    fn merge_sources<F>(file: Option<&str>, env: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = parse_section(file)?;
        let defaults = Self::default();

        let backend = match env(ENV_BACKEND).or(section.backend) {
            Some(name) => name.parse()?,
            None => defaults.backend,
        };
        let host = env(ENV_HOST).or(section.host).unwrap_or(defaults.host);
        let user = env(ENV_USER).or(section.user).unwrap_or_default();
        let password = env(ENV_PASSWORD).or(section.password).unwrap_or_default();
        let schema = env(ENV_SCHEMA).or(section.schema).unwrap_or(defaults.schema);
        let path = env(ENV_PATH).map(PathBuf::from).or(section.path);

        Ok(Self {
            backend,
            host,
            user,
            password,
            schema,
            path,
        })
    }

    /// Check that the fields the backend needs are present.
    pub fn validate(&self) -> Result<(), StoreError> {
        match self.backend {
            Backend::MySql => {
                if self.host.trim().is_empty() {
                    return Err(StoreError::config(format!(
                        "Missing host. Set {} or add to config file",
                        ENV_HOST
                    )));
                }
                if self.user.trim().is_empty() {
                    return Err(StoreError::config(format!(
                        "Missing user. Set {} or add to config file",
                        ENV_USER
                    )));
                }
                if self.schema.trim().is_empty() {
                    return Err(StoreError::config(format!(
                        "Missing schema. Set {} or add to config file",
                        ENV_SCHEMA
                    )));
                }
                self.host_and_port()?;
            }
            Backend::Sqlite => {
                if self.path.is_none() {
                    return Err(StoreError::config(format!(
                        "Missing database path. Set {} or add to config file",
                        ENV_PATH
                    )));
                }
            }
        }
        Ok(())
    }

    /// Split `host` into host name and port, defaulting to 3306.
    ///
    /// Accepts `host`, `host:port`, `[v6addr]` and `[v6addr]:port`.
    /// A bare IPv6 address without brackets is taken whole.
    pub fn host_and_port(&self) -> Result<(String, u16), StoreError> {
        let host = self.host.trim();
        let parse_port = |port: &str| {
            port.parse::<u16>().map_err(|_| {
                StoreError::config(format!("Invalid port '{}' in host '{}'", port, host))
            })
        };

        if let Some(rest) = host.strip_prefix('[') {
            let (addr, tail) = rest.split_once(']').ok_or_else(|| {
                StoreError::config(format!("Unterminated IPv6 address in host '{}'", host))
            })?;
            return match tail.strip_prefix(':') {
                Some(port) => Ok((addr.to_string(), parse_port(port)?)),
                None if tail.is_empty() => Ok((addr.to_string(), DEFAULT_MYSQL_PORT)),
                None => Err(StoreError::config(format!("Malformed host '{}'", host))),
            };
        }

        match host.split_once(':') {
            Some((name, port)) if !port.contains(':') => Ok((name.to_string(), parse_port(port)?)),
            _ => Ok((host.to_string(), DEFAULT_MYSQL_PORT)),
        }
    }

    /// Connection target without the password, for logs and errors.
    pub fn redacted_target(&self) -> String {
        match self.backend {
            Backend::MySql => {
                let host = match self.host_and_port() {
                    Ok((name, port)) if name.contains(':') => format!("[{}]:{}", name, port),
                    Ok((name, port)) => format!("{}:{}", name, port),
                    Err(_) => self.host.clone(),
                };
                format!("mysql://{}@{}/{}", self.user, host, self.schema)
            }
            Backend::Sqlite => match &self.path {
                Some(path) => format!("sqlite://{}", path.display()),
                None => "sqlite://<unset>".to_string(),
            },
        }
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the config file.
    ConfigFile,
    /// Built-in default value.
    Default,
    /// Not set anywhere.
    Missing,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// Provenance of each setting.
#[derive(Debug)]
pub struct ConfigSources {
    pub backend: ConfigSource,
    pub host: ConfigSource,
    pub user: ConfigSource,
    pub password: ConfigSource,
    pub schema: ConfigSource,
    pub path: ConfigSource,
}

impl ConfigSources {
    /// Work out provenance from config file text and an environment lookup.
    ///
    /// An unparseable config file counts as absent here; `load` reports it.
    pub fn from_sources<F>(file: Option<&str>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = parse_section(file).unwrap_or_default();
        let pick = |var: &'static str, in_file: bool, fallback: ConfigSource| {
            if env(var).is_some() {
                ConfigSource::EnvVar(var)
            } else if in_file {
                ConfigSource::ConfigFile
            } else {
                fallback
            }
        };

        Self {
            backend: pick(ENV_BACKEND, section.backend.is_some(), ConfigSource::Default),
            host: pick(ENV_HOST, section.host.is_some(), ConfigSource::Default),
            user: pick(ENV_USER, section.user.is_some(), ConfigSource::Missing),
            password: pick(ENV_PASSWORD, section.password.is_some(), ConfigSource::Missing),
            schema: pick(ENV_SCHEMA, section.schema.is_some(), ConfigSource::Default),
            path: pick(ENV_PATH, section.path.is_some(), ConfigSource::Missing),
        }
    }
}

/// Determine where each setting is coming from in the current process.
pub fn config_sources() -> ConfigSources {
    let content = read_config_file().ok().flatten();
    ConfigSources::from_sources(content.as_deref(), |key| std::env::var(key).ok())
}

/// Return the path to the database config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("killbot").join("database.toml"))
}

/// Read the config file; a missing file is not an error.
fn read_config_file() -> Result<Option<String>, StoreError> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_section(file: Option<&str>) -> Result<DatabaseSection, StoreError> {
    let Some(content) = file else {
        return Ok(DatabaseSection::default());
    };
    let config: ConfigFile = toml::from_str(content)
        .map_err(|e| StoreError::config(format!("Failed to parse config file: {}", e)))?;
    Ok(config.database.unwrap_or_default())
}
