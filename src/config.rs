//! Server configuration from environment variables

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;

/// Runtime settings of the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `INDUCTION_DB_PATH`, defaults to `$HOME/.induction-bot/induction.db`
    pub db_path: PathBuf,
    /// `PORT`
    pub port: u16,
    /// `INDUCTION_SEED_CATALOG`; `0` or `false` disables seeding an empty catalog
    pub seed_catalog: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("INDUCTION_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".induction-bot").join("induction.db")
            },
            PathBuf::from,
        );

        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let seed_catalog = lookup("INDUCTION_SEED_CATALOG").is_none_or(|v| {
            !matches!(v.trim().to_lowercase().as_str(), "0" | "false")
        });

        Self {
            db_path,
            port,
            seed_catalog,
        }
    }
}
