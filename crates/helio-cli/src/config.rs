//! Environment-driven configuration.
//!
//! Precedence for every setting:
//! 1) command-line flag
//! 2) environment variable
//! 3) built-in default

use anyhow::{anyhow, Context, Result};
use helio_resolver::ResolverConfig;
use helio_tariff::FioBSchedule;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const HELIO_FIO_B_SCHEDULE_ENV: &str = "HELIO_FIO_B_SCHEDULE";
pub(crate) const HELIO_REQUIRED_KEYS_ENV: &str = "HELIO_REQUIRED_KEYS";
pub(crate) const HELIO_LOG_ENV: &str = "HELIO_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Read an env var, treating unset and blank the same way.
fn env_value(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(v) => {
            let v = v.trim();
            Ok((!v.is_empty()).then(|| v.to_string()))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(anyhow!("{name} is not valid UTF-8")),
    }
}

/// Fio B schedule:
/// 1) `--schedule <file>`
/// 2) env var `HELIO_FIO_B_SCHEDULE` (path to a JSON file)
/// 3) the built-in Lei 14.300 table
pub(crate) fn fio_b_schedule(flag: Option<&Path>) -> Result<FioBSchedule> {
    let path = match flag {
        Some(p) => Some(p.to_path_buf()),
        None => env_value(HELIO_FIO_B_SCHEDULE_ENV)?.map(PathBuf::from),
    };
    match path {
        Some(path) => load_schedule(&path),
        None => Ok(FioBSchedule::default()),
    }
}

pub(crate) fn load_schedule(path: &Path) -> Result<FioBSchedule> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read Fio B schedule {}", path.display()))?;
    let schedule = FioBSchedule::from_json(&text)
        .map_err(|e| anyhow!("invalid Fio B schedule {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), anos = schedule.years().count(), "loaded Fio B schedule");
    Ok(schedule)
}

/// Resolver configuration; the required set comes from:
/// 1) `--required a,b,c`
/// 2) env var `HELIO_REQUIRED_KEYS` (comma separated)
/// 3) the default four keys
pub(crate) fn resolver_config(flag: Option<&str>) -> Result<ResolverConfig> {
    let raw = match flag {
        Some(v) => Some(v.to_string()),
        None => env_value(HELIO_REQUIRED_KEYS_ENV)?,
    };
    let config = ResolverConfig::default();
    match raw {
        Some(raw) => {
            let keys = parse_key_list(&raw);
            if keys.is_empty() {
                return Err(anyhow!("invalid required key list {raw:?} (expected comma-separated keys)"));
            }
            Ok(config.with_required(keys))
        }
        None => Ok(config),
    }
}

pub(crate) fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Log filter directive:
/// 1) `-v` (debug) / `-vv` (trace)
/// 2) env var `HELIO_LOG`
/// 3) `warn`
pub(crate) fn log_filter(verbose: u8) -> Result<String> {
    Ok(match verbose {
        0 => env_value(HELIO_LOG_ENV)?.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn key_list_trims_and_skips_blanks() {
        assert_eq!(
            parse_key_list(" cliente.nome, ,[cliente_email],"),
            vec!["cliente.nome".to_string(), "[cliente_email]".to_string()]
        );
        assert!(parse_key_list(" , ").is_empty());
    }

    #[test]
    fn required_flag_overrides_default() {
        let config = resolver_config(Some("cliente_nome,financeiro.preco_total")).unwrap();
        assert_eq!(config.required.len(), 2);
        assert!(config.required.contains("cliente.nome"));
        assert!(resolver_config(Some(" , ")).is_err());
    }

    #[test]
    fn schedule_file_loads_and_rejects_garbage() {
        let mut good = tempfile::NamedTempFile::new().unwrap();
        write!(good, r#"{{"anos": {{"2030": 0.2, "2031": 0.1}}, "fallback": "mais_proximo"}}"#).unwrap();
        let schedule = fio_b_schedule(Some(good.path())).unwrap();
        assert_eq!(schedule.charged_fraction(2040), Some(0.1));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, r#"{{"anos": {{"2030": 1.5}}}}"#).unwrap();
        let err = fio_b_schedule(Some(bad.path())).unwrap_err();
        assert!(err.to_string().contains("invalid Fio B schedule"));

        assert!(fio_b_schedule(Some(Path::new("/nonexistent/schedule.json"))).is_err());
    }

    #[test]
    fn verbosity_beats_environment() {
        assert_eq!(log_filter(1).unwrap(), "debug");
        assert_eq!(log_filter(3).unwrap(), "trace");
    }
}
