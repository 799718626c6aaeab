pub use crate::utils::database;
use crate::modules::{
    auth::service::{
        firebase::{FirebaseIdentityProvider, DEFAULT_LOOKUP_ENDPOINT},
        identity::IdentityStrategy,
    },
    meal::repository::{InMemoryMealRepository, MealRepository, PostgresMealRepository},
};
use async_trait::async_trait;
use std::{env, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    MissingVar(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] database::Error),
    #[error("Failed to serve http: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u32,
}

#[derive(Clone, Debug)]
pub enum StoreConfig {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Clone, Debug, PartialEq)]
pub enum IdentityConfig {
    Verified { api_key: String, endpoint: String },
    Asserted,
}

impl IdentityConfig {
    /// Asserted identity is a development shim and never allowed in production.
    pub fn select(
        strategy: &str,
        environment: AppEnvironment,
        api_key: Option<String>,
        endpoint: Option<String>,
    ) -> Result<Self, ConfigError> {
        match strategy {
            "verified" => Ok(Self::Verified {
                api_key: api_key.ok_or(ConfigError::MissingVar("FIREBASE_API_KEY"))?,
                endpoint: endpoint.unwrap_or_else(|| DEFAULT_LOOKUP_ENDPOINT.to_string()),
            }),
            "asserted" if environment == AppEnvironment::Development => Ok(Self::Asserted),
            other => Err(ConfigError::InvalidValue(
                "AUTH_STRATEGY",
                other.to_string(),
            )),
        }
    }
}

/// Public values a browser client needs to talk to the identity provider.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub identity: IdentityConfig,
    pub client: ClientConfig,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(name, raw))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parsed::<u32>("PORT", "5000")?;
        let environment =
            AppEnvironment::from(env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()));

        let store = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .as_str()
        {
            "postgres" => StoreConfig::Postgres {
                url: required("DATABASE_URL")?,
                max_connections: parsed::<u32>("DATABASE_MAX_CONNECTIONS", "5")?,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORE_BACKEND",
                    other.to_string(),
                ))
            }
        };

        let identity = IdentityConfig::select(
            &env::var("AUTH_STRATEGY").unwrap_or_else(|_| "verified".to_string()),
            environment,
            env::var("FIREBASE_API_KEY").ok(),
            env::var("IDENTITY_LOOKUP_ENDPOINT").ok(),
        )?;

        let client = ClientConfig {
            api_key: env::var("FIREBASE_API_KEY").ok(),
            auth_domain: env::var("FIREBASE_AUTH_DOMAIN").ok(),
            project_id: env::var("FIREBASE_PROJECT_ID").ok(),
            storage_bucket: env::var("FIREBASE_STORAGE_BUCKET").ok(),
            messaging_sender_id: env::var("FIREBASE_MESSAGING_SENDER_ID").ok(),
            app_id: env::var("FIREBASE_APP_ID").ok(),
            measurement_id: env::var("FIREBASE_MEASUREMENT_ID").ok(),
        };

        Ok(Self {
            app: AppConfig { host, port },
            store,
            identity,
            client,
        })
    }
}

#[derive(Clone)]
pub struct Context {
    pub app: AppConfig,
    pub meals: Arc<dyn MealRepository>,
    pub identity: IdentityStrategy,
    pub client: ClientConfig,
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Result<Context, StartupError>;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Result<Context, StartupError> {
        let meals: Arc<dyn MealRepository> = match self.store {
            StoreConfig::Postgres {
                url,
                max_connections,
            } => {
                let db_conn = database::connect(&url, max_connections).await?;
                database::migrate(&db_conn).await?;
                Arc::new(PostgresMealRepository::new(db_conn))
            }
            StoreConfig::Memory => {
                tracing::warn!("Using the in-memory meal store, data will not survive a restart");
                Arc::new(InMemoryMealRepository::new())
            }
        };

        let identity = match self.identity {
            IdentityConfig::Verified { api_key, endpoint } => {
                IdentityStrategy::Verified(Arc::new(FirebaseIdentityProvider::new(endpoint, api_key)))
            }
            IdentityConfig::Asserted => {
                tracing::warn!("Trusting the x-user-id header for identity, never use this in production");
                IdentityStrategy::Asserted
            }
        };

        Ok(Context {
            app: self.app,
            meals,
            identity,
            client: self.client,
        })
    }
}
