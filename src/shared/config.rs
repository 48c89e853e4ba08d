use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub database: DatabaseConfig,
    pub connectivity: ConnectivityConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Seconds between health probes.
    pub probe_interval: u64,
    /// Per-probe timeout; a hung probe counts as a transport failure.
    pub probe_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Whether the engine runs the periodic reconciliation timer.
    pub auto_sync: bool,
    /// Seconds between periodic reconciliation passes.
    pub interval: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/eventdesk.db".to_string(),
                max_connections: 5,
            },
            connectivity: ConnectivityConfig {
                probe_interval: 60,
                probe_timeout: 5,
            },
            reconcile: ReconcileConfig {
                auto_sync: true,
                interval: 300, // 5 minutes
            },
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("EVENTDESK_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("EVENTDESK_DB_MAX_CONNECTIONS") {
            if let Some(value) = parse_u64(&v) {
                cfg.database.max_connections = value.clamp(1, 64) as u32;
            }
        }
        if let Ok(v) = std::env::var("EVENTDESK_PROBE_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.connectivity.probe_interval = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("EVENTDESK_PROBE_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.connectivity.probe_timeout = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("EVENTDESK_AUTO_SYNC") {
            cfg.reconcile.auto_sync = parse_bool(&v, cfg.reconcile.auto_sync);
        }
        if let Ok(v) = std::env::var("EVENTDESK_SYNC_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.reconcile.interval = value.max(1);
            }
        }

        cfg
    }
}

fn parse_bool(value: &str, default: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        let cfg = SyncConfig::default();
        assert_eq!(cfg.connectivity.probe_interval, 60);
        assert_eq!(cfg.connectivity.probe_timeout, 5);
        assert_eq!(cfg.reconcile.interval, 300);
        assert!(cfg.reconcile.auto_sync);
    }

    #[test]
    fn parse_bool_falls_back_on_garbage() {
        assert!(parse_bool("yes", false));
        assert!(!parse_bool("off", true));
        assert!(parse_bool("banana", true));
    }
}
