use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use pit_application::LockServiceConfig;
use pit_core::AppError;
use pit_domain::DEFAULT_LEASE_SECONDS;
use pit_infrastructure::{DatabaseConfig, PoolConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_SERVICE_PORT: u16 = 60001;
const SERVICE_PORT_FLAG: &str = "--service-port";

/// Storage adapter selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "LOCK_STORE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database: DatabaseConfig,
    pub pool: PoolConfig,
    pub lock_service: LockServiceConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_sources(env::args().skip(1), |name| env::var(name).ok())
    }

    fn from_sources(
        args: impl IntoIterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let host = lookup("LOCK_MANAGER_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());

        let env_port = lookup("LOCK_MANAGER_PORT")
            .map(|value| parse_port("LOCK_MANAGER_PORT", value.as_str()))
            .transpose()?;
        let port = service_port_argument(args)?
            .or(env_port)
            .unwrap_or(DEFAULT_SERVICE_PORT);

        let store_backend = lookup("LOCK_STORE_BACKEND")
            .map(|value| StoreBackend::from_str(value.as_str()))
            .transpose()?
            .unwrap_or(StoreBackend::Postgres);

        let default_lease_seconds = match lookup("LOCK_DEFAULT_LEASE_SECONDS") {
            Some(value) => value.trim().parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid LOCK_DEFAULT_LEASE_SECONDS: {error}"))
            })?,
            None => DEFAULT_LEASE_SECONDS,
        };

        Ok(Self {
            host,
            port,
            store_backend,
            database: DatabaseConfig::from_lookup(&lookup)?,
            pool: PoolConfig::from_lookup(&lookup)?,
            lock_service: LockServiceConfig::new(default_lease_seconds)?,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.host).map_err(|error| {
            AppError::Internal(format!("invalid LOCK_MANAGER_HOST '{}': {error}", self.host))
        })?;
        Ok(SocketAddr::from((host, self.port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Reads `--service-port <port>` or `--service-port=<port>`.
fn service_port_argument(args: impl IntoIterator<Item = String>) -> Result<Option<u16>, AppError> {
    let mut args = args.into_iter();
    let mut port = None;

    while let Some(arg) = args.next() {
        if arg == SERVICE_PORT_FLAG {
            let value = args.next().ok_or_else(|| {
                AppError::Validation(format!("{SERVICE_PORT_FLAG} requires a value"))
            })?;
            port = Some(parse_port(SERVICE_PORT_FLAG, value.as_str())?);
        } else if let Some(value) = arg.strip_prefix("--service-port=") {
            port = Some(parse_port(SERVICE_PORT_FLAG, value)?);
        }
    }

    Ok(port)
}

fn parse_port(name: &str, value: &str) -> Result<u16, AppError> {
    match value.trim().parse::<u16>() {
        Ok(0) => Err(AppError::Validation(format!("{name} must not be 0"))),
        Ok(port) => Ok(port),
        Err(error) => Err(AppError::Validation(format!(
            "invalid {name} '{value}': {error}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pit_core::AppError;

    use super::{ApiConfig, StoreBackend};

    fn load(args: &[&str], vars: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_sources(
            args.iter().map(|arg| (*arg).to_owned()),
            move |name| vars.get(name).cloned(),
        )
    }

    #[test]
    fn defaults_listen_on_service_port() {
        let config = load(&[], &[]).unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(config.port, 60001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.store_backend, StoreBackend::Postgres);
        assert_eq!(config.lock_service.default_lease().as_seconds(), 60);
    }

    #[test]
    fn service_port_flag_overrides_environment() {
        let config = load(
            &["--service-port", "7000"],
            &[("LOCK_MANAGER_PORT", "6500")],
        )
        .unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(config.port, 7000);

        let config = load(&["--service-port=7100"], &[]).unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(config.port, 7100);
    }

    #[test]
    fn service_port_flag_requires_value() {
        assert!(matches!(
            load(&["--service-port"], &[]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&["--service-port", "abc"], &[]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn memory_backend_is_selectable() {
        let config = load(&[], &[("LOCK_STORE_BACKEND", "Memory")])
            .unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn unknown_backend_and_zero_lease_are_rejected() {
        assert!(matches!(
            load(&[], &[("LOCK_STORE_BACKEND", "redis")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[], &[("LOCK_DEFAULT_LEASE_SECONDS", "0")]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn socket_address_rejects_host_names() {
        let mut config = load(&[], &[]).unwrap_or_else(|error| panic!("{error}"));
        config.host = "localhost".to_owned();
        assert!(config.socket_address().is_err());
    }
}
