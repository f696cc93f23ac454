use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "ClinIRx";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "CLINIRX_DB_PATH";

/// Environment variable overriding the HTTP bind address.
pub const BIND_ADDR_ENV: &str = "CLINIRX_BIND_ADDR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8085";

/// Get the application data directory (~/ClinIRx/).
///
/// Falls back to the current directory when no home directory can be resolved
/// (containers running as a user without a passwd entry).
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Database file location: `$CLINIRX_DB_PATH` or `~/ClinIRx/clinirx.db`.
pub fn database_path() -> PathBuf {
    match std::env::var(DB_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => app_data_dir().join("clinirx.db"),
    }
}

/// Bind address for the HTTP API: `$CLINIRX_BIND_ADDR` or `127.0.0.1:8085`.
pub fn bind_addr() -> Result<SocketAddr, String> {
    let raw = std::env::var(BIND_ADDR_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    raw.parse()
        .map_err(|e| format!("Invalid {BIND_ADDR_ENV} value '{raw}': {e}"))
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "clinirx=debug,tower_http=debug,info"
    } else {
        "clinirx=info,warn"
    }
}

// ═══════════════════════════════════════════════════════════
// Engine configuration
// ═══════════════════════════════════════════════════════════

/// How the ensemble perturbs scores between otherwise equal candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum JitterMode {
    /// Seeded uniform factor in [0.95, 1.05]; identical requests rank identically.
    Seeded { seed: u64 },
    /// Factor fixed at 1.0.
    Disabled,
}

/// Tunables for the safety engine and the suggestion ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_suggestions: usize,
    /// Upper bound on k for the population clustering step.
    pub cluster_count: usize,
    /// How many members of the subject's cluster feed the frequency count.
    pub similar_patient_limit: usize,
    /// How many same-gender candidates are fetched before clustering.
    pub population_pool_limit: usize,
    /// Safety-optimized candidates must score strictly above this.
    pub safety_threshold: f64,
    /// Content-based candidates must score strictly above this.
    pub content_similarity_threshold: f64,
    pub jitter: JitterMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            cluster_count: 3,
            similar_patient_limit: 10,
            population_pool_limit: 500,
            safety_threshold: 0.3,
            content_similarity_threshold: 0.01,
            jitter: JitterMode::Seeded { seed: 0x5eed },
        }
    }
}

impl EngineConfig {
    /// Configuration for deterministic tests: jitter off.
    pub fn deterministic() -> Self {
        Self {
            jitter: JitterMode::Disabled,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        let dir = app_data_dir();
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn default_database_lives_under_app_data() {
        if std::env::var(DB_PATH_ENV).is_ok() {
            return;
        }
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("clinirx.db"));
    }

    #[test]
    fn default_engine_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.cluster_count, 3);
        assert_eq!(config.similar_patient_limit, 10);
        assert!((config.safety_threshold - 0.3).abs() < f64::EPSILON);
        assert!((config.content_similarity_threshold - 0.01).abs() < f64::EPSILON);
        assert!(matches!(config.jitter, JitterMode::Seeded { .. }));
    }

    #[test]
    fn deterministic_config_disables_jitter() {
        assert_eq!(EngineConfig::deterministic().jitter, JitterMode::Disabled);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn log_filter_targets_crate() {
        assert!(default_log_filter().contains("clinirx"));
    }
}
