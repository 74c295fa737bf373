use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use chirpy_db::{Database, JsonFile, SqliteSnapshot, TokenConfig};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    Sqlite,
}

/// Everything read from the environment, once, at startup.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_dir: PathBuf,
    pub backend: Backend,
    pub reset_on_start: bool,
    pub static_dir: PathBuf,
    pub jwt_secret: String,
    pub polka_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET_KEY").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("JWT_SECRET_KEY is unset or still a placeholder; set it in .env and restart");
        }

        let port = match lookup("CHIRPY_PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid CHIRPY_PORT {:?}", v))?,
            None => 8080,
        };

        let backend = match lookup("CHIRPY_DB_BACKEND").as_deref() {
            None | Some("json") => Backend::Json,
            Some("sqlite") => Backend::Sqlite,
            Some(other) => bail!("unknown CHIRPY_DB_BACKEND {:?} (expected json or sqlite)", other),
        };

        let reset_on_start = match lookup("CHIRPY_RESET_ON_START").as_deref() {
            None => true,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => bail!("invalid CHIRPY_RESET_ON_START {:?}", other),
        };

        Ok(Self {
            host: lookup("CHIRPY_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_dir: lookup("CHIRPY_DB_DIR").unwrap_or_else(|| ".".into()).into(),
            backend,
            reset_on_start,
            static_dir: lookup("CHIRPY_STATIC_DIR").unwrap_or_else(|| ".".into()).into(),
            jwt_secret,
            polka_key: lookup("POLKA_API_KEY").unwrap_or_default(),
        })
    }

    /// Open the configured store, truncating it first unless told not to.
    pub fn open_database(&self) -> Result<Database> {
        let tokens = TokenConfig::new(self.jwt_secret.clone());
        let db = match self.backend {
            Backend::Json => Database::open(JsonFile::new(&self.db_dir), tokens)?,
            Backend::Sqlite => Database::open(SqliteSnapshot::open(&self.db_dir)?, tokens)?,
        };

        if self.reset_on_start {
            db.reset()?;
        }
        Ok(db)
    }
}
