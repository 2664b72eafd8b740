//! Server configuration loaded from environment variables.
//!
//! Every setting has a default; absent or unparseable values fall back to it.
//!
//! | Variable                    | Default        | Description                                   |
//! |-----------------------------|----------------|-----------------------------------------------|
//! | `PLOTCLUSTER_HOST`          | `0.0.0.0`      | Listen address                                |
//! | `PLOTCLUSTER_PORT`          | `8000`         | Listen port                                   |
//! | `PLOTCLUSTER_LOG_LEVEL`     | `info`         | tracing filter (trace/debug/info/warn/error)  |
//! | `PLOTCLUSTER_STATIC_DIR`    | `dist/browser` | Front-end bundle served at `/` (if present)   |
//! | `PLOTCLUSTER_KMEANS_N_INIT` | `10`           | k-means restarts per request                  |
//! | `PLOTCLUSTER_LINKAGE`       | `ward`         | ward / complete / average / single            |
//! | `PLOTCLUSTER_SEED`          | unset          | Fixed k-means seed for reproducible output    |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::cluster::Linkage;
use crate::dispatch::ClusterDispatcher;

/// Runtime configuration for the plotcluster server.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,

    /// Tracing filter string, e.g. `"plotcluster=debug,info"`.
    pub log_level: String,

    /// Directory of static front-end assets.
    pub static_dir: PathBuf,

    pub kmeans_n_init: usize,
    pub linkage: Linkage,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            log_level: "info".to_string(),
            static_dir: PathBuf::from("dist/browser"),
            kmeans_n_init: 10,
            linkage: Linkage::Ward,
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: env_parse(&lookup, "PLOTCLUSTER_HOST", defaults.host),
            port: env_parse(&lookup, "PLOTCLUSTER_PORT", defaults.port),
            log_level: env_str(&lookup, "PLOTCLUSTER_LOG_LEVEL", &defaults.log_level),
            static_dir: lookup("PLOTCLUSTER_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            kmeans_n_init: env_parse::<usize>(&lookup, "PLOTCLUSTER_KMEANS_N_INIT", defaults.kmeans_n_init)
                .max(1),
            linkage: lookup("PLOTCLUSTER_LINKAGE")
                .and_then(|v| parse_linkage(&v))
                .unwrap_or(defaults.linkage),
            seed: lookup("PLOTCLUSTER_SEED").and_then(|v| v.parse().ok()),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Dispatcher tuned by this configuration.
    pub fn dispatcher(&self) -> ClusterDispatcher {
        ClusterDispatcher {
            kmeans_n_init: self.kmeans_n_init,
            seed: self.seed,
            linkage: self.linkage,
            ..ClusterDispatcher::default()
        }
    }
}

fn parse_linkage(s: &str) -> Option<Linkage> {
    match s.trim().to_ascii_lowercase().as_str() {
        "ward" => Some(Linkage::Ward),
        "complete" => Some(Linkage::Complete),
        "average" => Some(Linkage::Average),
        "single" => Some(Linkage::Single),
        _ => None,
    }
}

fn env_str(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
