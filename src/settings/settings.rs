use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub auth: Auth,
    pub breaker: Breaker,
    pub identity: Identity,
    pub notification: Notification,
    pub fault_demo: FaultDemo,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    // TLS is on only when both are set.
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Deserialize)]
pub struct Auth {
    pub secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("secret", &"<redacted>")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl Auth {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_minutes.saturating_mul(60))
    }
}

fn default_token_ttl_minutes() -> u64 {
    8 * 60
}

#[derive(Debug, Deserialize)]
pub struct Breaker {
    pub failure_threshold: u32,
    pub recovery_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    pub backend: String, // "memory" or "mysql"
    pub dsn: Option<String>,
    pub seed_admin: Option<SeedAdmin>,
}

#[derive(Deserialize)]
pub struct SeedAdmin {
    pub name: String,
    pub gmail: String,
    pub password: String,
}

impl fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("name", &self.name)
            .field("gmail", &self.gmail)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct Notification {
    pub backend: String, // "log" or "queued"
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    64
}

#[derive(Debug, Deserialize)]
pub struct FaultDemo {
    pub target: u32,
    pub sides: u32,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "WORKCLOCK";
const SECRET_ENV: &str = "JWT_SECRET";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let mut builder = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
    if let Ok(secret) = std::env::var(SECRET_ENV) {
        builder = builder
            .set_override("auth.secret", secret)
            .map_err(|e| anyhow!(e))?;
    }

    let settings: Settings = builder
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

impl Settings {
    fn validate(&self) -> Result<()> {
        if self.auth.secret.is_empty() {
            return Err(anyhow!("auth.secret must not be empty"));
        }
        if self.auth.token_ttl_minutes == 0 {
            return Err(anyhow!("auth.token_ttl_minutes must be positive"));
        }
        if self.auth.token_ttl_minutes.checked_mul(60).is_none() {
            return Err(anyhow!("auth.token_ttl_minutes is out of range"));
        }
        if self.fault_demo.sides == 0 {
            return Err(anyhow!("fault_demo.sides must be positive"));
        }
        if self.http.cert_path.is_some() != self.http.key_path.is_some() {
            return Err(anyhow!("http.cert_path and http.key_path go together"));
        }
        Ok(())
    }
}
