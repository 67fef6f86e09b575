use clap::{Parser, ValueEnum};
use onepass_core::{Resource, ResourceId};
use onepass_gateway::telemetry::LogFormat;
use onepass_store::FetchStrategy;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "ONEPASS_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "ONEPASS_PUBLIC_BASE_URL";
pub const LINK_TTL_SECS_ENV: &str = "ONEPASS_LINK_TTL_SECS";
pub const STORE_BACKEND_ENV: &str = "ONEPASS_STORE";
pub const REDIS_URL_ENV: &str = "ONEPASS_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "ONEPASS_REDIS_KEY_PREFIX";
pub const REDIS_FETCH_ENV: &str = "ONEPASS_REDIS_FETCH";
pub const STORE_TIMEOUT_MS_ENV: &str = "ONEPASS_STORE_TIMEOUT_MS";
pub const STORE_CAPACITY_ENV: &str = "ONEPASS_STORE_CAPACITY";
pub const CATALOG_BACKEND_ENV: &str = "ONEPASS_CATALOG";
pub const MYSQL_DSN_ENV: &str = "ONEPASS_MYSQL_DSN";
pub const SEED_RESOURCE_ENV: &str = "ONEPASS_SEED_RESOURCE";
pub const LOG_FORMAT_ENV: &str = "ONEPASS_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LINK_TTL_SECS: u64 = 60;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_STORE_CAPACITY: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StoreBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackendArg::InMemory => write!(f, "in-memory"),
            StoreBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RedisFetchArg {
    /// Native GETDEL, Redis 6.2 and later.
    #[value(name = "getdel")]
    GetDel,
    /// Server-side script, for older servers.
    #[value(name = "script")]
    Script,
}

impl From<RedisFetchArg> for FetchStrategy {
    fn from(arg: RedisFetchArg) -> Self {
        match arg {
            RedisFetchArg::GetDel => FetchStrategy::GetDel,
            RedisFetchArg::Script => FetchStrategy::Script,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for CatalogBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogBackendArg::InMemory => write!(f, "in-memory"),
            CatalogBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

/// Parses `ID=NAME=TARGET`. The target may itself contain `=`.
fn parse_seed_resource(raw: &str) -> Result<Resource, String> {
    let mut parts = raw.splitn(3, '=');
    let (Some(id), Some(name), Some(target)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected ID=NAME=TARGET, got '{raw}'"));
    };
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid resource id '{id}': {e}"))?;
    if target.is_empty() {
        return Err(format!("resource {id} has an empty target"));
    }
    Ok(Resource {
        id: ResourceId(id),
        name: name.to_string(),
        target_location: target.to_string(),
    })
}

#[derive(Debug, Parser)]
#[command(name = "onepass-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Makes `verify_url` absolute, e.g. `https://files.example.com`.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(long, env = LINK_TTL_SECS_ENV, default_value_t = DEFAULT_LINK_TTL_SECS)]
    pub link_ttl_secs: u64,

    #[arg(
        long,
        env = STORE_BACKEND_ENV,
        value_enum,
        default_value_t = StoreBackendArg::InMemory
    )]
    pub store: StoreBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("store", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = onepass_store::DEFAULT_KEY_PREFIX)]
    pub redis_key_prefix: String,

    #[arg(long, env = REDIS_FETCH_ENV, value_enum, default_value_t = RedisFetchArg::GetDel)]
    pub redis_fetch: RedisFetchArg,

    #[arg(long, env = STORE_TIMEOUT_MS_ENV, default_value_t = DEFAULT_STORE_TIMEOUT_MS)]
    pub store_timeout_ms: u64,

    /// Maximum live tokens held by the in-memory store.
    #[arg(long, env = STORE_CAPACITY_ENV, default_value_t = DEFAULT_STORE_CAPACITY)]
    pub store_capacity: u64,

    #[arg(
        long,
        env = CATALOG_BACKEND_ENV,
        value_enum,
        default_value_t = CatalogBackendArg::InMemory
    )]
    pub catalog: CatalogBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("catalog", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Seeds the in-memory catalog, `ID=NAME=TARGET`. Repeat the flag for
    /// more than one resource; targets are taken verbatim.
    #[arg(long, env = SEED_RESOURCE_ENV, value_parser = parse_seed_resource)]
    pub seed_resource: Vec<Resource>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = CLI::try_parse_from(["onepass-gateway"]).unwrap();
        assert_eq!(cli.listen_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.link_ttl_secs, 60);
        assert_eq!(cli.store, StoreBackendArg::InMemory);
        assert_eq!(cli.redis_key_prefix, "p_access:");
        assert_eq!(cli.redis_fetch, RedisFetchArg::GetDel);
        assert_eq!(cli.catalog, CatalogBackendArg::InMemory);
        assert!(cli.seed_resource.is_empty());
    }

    #[test]
    fn redis_requires_url() {
        assert!(CLI::try_parse_from(["onepass-gateway", "--store", "redis"]).is_err());
        let cli = CLI::try_parse_from([
            "onepass-gateway",
            "--store",
            "redis",
            "--redis-url",
            "redis://127.0.0.1:6379",
            "--redis-fetch",
            "script",
        ])
        .unwrap();
        assert_eq!(FetchStrategy::from(cli.redis_fetch), FetchStrategy::Script);
    }

    #[test]
    fn mysql_requires_dsn() {
        assert!(CLI::try_parse_from(["onepass-gateway", "--catalog", "mysql"]).is_err());
    }

    #[test]
    fn seed_resources_are_repeatable() {
        let cli = CLI::try_parse_from([
            "onepass-gateway",
            "--seed-resource",
            "7=Annual Report=/files/7.pdf",
            "--seed-resource",
            "8=Signed=https://cdn.example.com/8?sig=abc",
        ])
        .unwrap();

        assert_eq!(cli.seed_resource.len(), 2);
        assert_eq!(cli.seed_resource[0].id, ResourceId(7));
        assert_eq!(
            cli.seed_resource[1].target_location,
            "https://cdn.example.com/8?sig=abc"
        );
    }

    #[test]
    fn seed_target_keeps_commas() {
        let cli = CLI::try_parse_from([
            "onepass-gateway",
            "--seed-resource",
            "9=Tiles=https://cdn.example.com/t?x=1,2&sig=a,b",
        ])
        .unwrap();

        assert_eq!(cli.seed_resource.len(), 1);
        assert_eq!(
            cli.seed_resource[0].target_location,
            "https://cdn.example.com/t?x=1,2&sig=a,b"
        );
    }

    #[test]
    fn malformed_seed_is_rejected() {
        assert!(parse_seed_resource("7=missing-target").is_err());
        assert!(parse_seed_resource("x=Name=/t").is_err());
        assert!(parse_seed_resource("7=Name=").is_err());
    }
}
