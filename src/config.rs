use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use crate::dataset::TableSource;
use crate::logging::LogFormat;

const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub source: TableSource,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Resolves configuration from command-line flags first, then environment variables.
    ///
    /// Flags: `--db <path>`, `--matches <path>`, `--deliveries <path>`, `--port <n>`.
    /// Environment: `IPL_STATS_DB`, `IPL_STATS_MATCHES_PARQUET`, `IPL_STATS_DELIVERIES_PARQUET`,
    /// `IPL_STATS_BIND`, `PORT` / `IPL_STATS_PORT`, `IPL_STATS_LOG_FORMAT`.
    pub fn resolve(args: &[String]) -> Result<Self> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    pub fn resolve_with(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let db = parse_path_arg(args, "--db").or_else(|| env("IPL_STATS_DB").map(PathBuf::from));
        let matches = parse_path_arg(args, "--matches")
            .or_else(|| env("IPL_STATS_MATCHES_PARQUET").map(PathBuf::from));
        let deliveries = parse_path_arg(args, "--deliveries")
            .or_else(|| env("IPL_STATS_DELIVERIES_PARQUET").map(PathBuf::from));

        let source = match (db, matches, deliveries) {
            (Some(db), _, _) => TableSource::Sqlite(db),
            (None, Some(matches), Some(deliveries)) => TableSource::Parquet {
                matches,
                deliveries,
            },
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(anyhow!(
                    "parquet source needs both a matches and a deliveries file"
                ));
            }
            (None, None, None) => {
                return Err(anyhow!(
                    "no table source configured (set IPL_STATS_DB or pass --db <path>)"
                ));
            }
        };

        let host = env("IPL_STATS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let port = match parse_value_arg(args, "--port")
            .or_else(|| env("PORT"))
            .or_else(|| env("IPL_STATS_PORT"))
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid port value {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid bind address {host}:{port}"))?;

        let log_format = match env("IPL_STATS_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            source,
            bind_addr,
            log_format,
        })
    }
}

pub fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    parse_value_arg(args, flag).map(PathBuf::from)
}

/// Accepts both `--flag=value` and `--flag value`.
pub fn parse_value_arg(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn flag_overrides_env_db() {
        let cfg = ServerConfig::resolve_with(
            &args(&["--db=/tmp/flag.sqlite"]),
            env_of(&[("IPL_STATS_DB", "/tmp/env.sqlite")]),
        )
        .unwrap();
        assert_eq!(cfg.source, TableSource::Sqlite(PathBuf::from("/tmp/flag.sqlite")));
        assert_eq!(cfg.bind_addr.port(), DEFAULT_PORT);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn parquet_pair_from_env() {
        let cfg = ServerConfig::resolve_with(
            &[],
            env_of(&[
                ("IPL_STATS_MATCHES_PARQUET", "m.parquet"),
                ("IPL_STATS_DELIVERIES_PARQUET", "d.parquet"),
                ("PORT", "8080"),
                ("IPL_STATS_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();
        assert!(matches!(cfg.source, TableSource::Parquet { .. }));
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_source_is_an_error() {
        assert!(ServerConfig::resolve_with(&[], env_of(&[])).is_err());
        assert!(
            ServerConfig::resolve_with(&args(&["--matches", "m.parquet"]), env_of(&[])).is_err()
        );
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = ServerConfig::resolve_with(
            &args(&["--db", "x.sqlite", "--port", "http"]),
            env_of(&[]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }
}
