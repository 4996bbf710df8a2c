//! Centralized configuration (environment variables + defaults).

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("DEMO_MODE=false requires {}", .0.join(", "))]
    MissingLedgerSettings(Vec<&'static str>),
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection details for the remote ledger, present only outside demo mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    pub rpc_url: String,
    pub keypair_path: PathBuf,
    pub program_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub demo_mode: bool,
    pub ledger: Option<LedgerSettings>,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub admin_ids: HashSet<String>,
}

impl AppConfig {
    /// Reads the process environment (after `.env`, if the caller loaded it).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let demo_mode = match get("DEMO_MODE") {
            None => true,
            Some(v) => parse_bool("DEMO_MODE", &v)?,
        };

        let ledger = if demo_mode {
            None
        } else {
            let rpc_url = get("LEDGER_RPC_URL");
            let keypair_path = get("LEDGER_KEYPAIR_PATH");
            let program_id = get("LEDGER_PROGRAM_ID");
            match (rpc_url, keypair_path, program_id) {
                (Some(rpc_url), Some(keypair_path), Some(program_id)) => Some(LedgerSettings {
                    rpc_url,
                    keypair_path: PathBuf::from(shellexpand::tilde(&keypair_path).as_ref()),
                    program_id,
                }),
                (rpc_url, keypair_path, program_id) => {
                    let mut missing = Vec::new();
                    if rpc_url.is_none() {
                        missing.push("LEDGER_RPC_URL");
                    }
                    if keypair_path.is_none() {
                        missing.push("LEDGER_KEYPAIR_PATH");
                    }
                    if program_id.is_none() {
                        missing.push("LEDGER_PROGRAM_ID");
                    }
                    return Err(ConfigError::MissingLedgerSettings(missing));
                }
            }
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            None => DEFAULT_DB_MAX_CONNECTIONS,
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| ConfigError::Invalid {
                    name: "DB_MAX_CONNECTIONS",
                    value: v.clone(),
                    reason: e.to_string(),
                })?
                .max(1),
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::Invalid {
                name: "BIND_ADDR",
                value: bind_raw.clone(),
                reason: e.to_string(),
            }
        })?;

        let admin_ids = get("SHIPLEDGER_ADMIN_IDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            demo_mode,
            ledger,
            database_url: get("DATABASE_URL"),
            db_max_connections,
            bind_addr,
            admin_ids,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            demo_mode: true,
            ledger: None,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            admin_ids: HashSet::new(),
        }
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

/// Printed by the server before exiting when live mode is misconfigured.
pub const LIVE_MODE_GUIDANCE: &str = "\
Live ledger mode needs:
  LEDGER_RPC_URL       RPC endpoint, e.g. https://api.devnet.solana.com
  LEDGER_KEYPAIR_PATH  payer keypair file, e.g. ~/.config/solana/id.json
  LEDGER_PROGRAM_ID    deployed registry program id
Set DEMO_MODE=true to run with the simulated ledger instead.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_to_demo_mode_in_memory() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn live_mode_lists_every_missing_variable() {
        let err = config(&[("DEMO_MODE", "false"), ("LEDGER_RPC_URL", "http://localhost:8899")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingLedgerSettings(vec!["LEDGER_KEYPAIR_PATH", "LEDGER_PROGRAM_ID"])
        );
    }

    #[test]
    fn live_mode_expands_keypair_home() {
        let cfg = config(&[
            ("DEMO_MODE", "false"),
            ("LEDGER_RPC_URL", "http://localhost:8899"),
            ("LEDGER_KEYPAIR_PATH", "/keys/id.json"),
            ("LEDGER_PROGRAM_ID", "Prog1111"),
        ])
        .unwrap();
        let ledger = cfg.ledger.unwrap();
        assert_eq!(ledger.keypair_path, PathBuf::from("/keys/id.json"));
        assert!(!cfg.demo_mode);
    }

    #[test]
    fn admin_ids_and_pool_size_are_parsed() {
        let cfg = config(&[
            ("SHIPLEDGER_ADMIN_IDS", " alice, ,bob "),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DATABASE_URL", "  "),
        ])
        .unwrap();
        assert!(cfg.admin_ids.contains("alice") && cfg.admin_ids.contains("bob"));
        assert_eq!(cfg.admin_ids.len(), 2);
        assert_eq!(cfg.db_max_connections, 12);
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn bad_values_are_reported_by_name() {
        assert!(matches!(
            config(&[("DEMO_MODE", "maybe")]),
            Err(ConfigError::Invalid { name: "DEMO_MODE", .. })
        ));
        assert!(matches!(
            config(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::Invalid { name: "BIND_ADDR", .. })
        ));
    }
}
