use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::services::engine::EngineConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// File logging is on when a directory is configured.
    pub log_dir: Option<PathBuf>,
    pub concept_graph_path: String,
    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = std::env::var("LOG_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let concept_graph_path = std::env::var("CONCEPT_GRAPH_PATH")
            .unwrap_or_else(|_| "./data/concept_graph.json".to_string());

        let mut engine = EngineConfig::default();
        if let Some(cap) = std::env::var("EVENT_HISTORY_CAP")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
        {
            engine.max_events_per_key = cap;
        }

        Self {
            host,
            port,
            log_level,
            log_dir,
            concept_graph_path,
            engine,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
