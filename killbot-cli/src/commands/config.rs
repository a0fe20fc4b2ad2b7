use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use killbot_db::{ConfigSource, DatabaseConfig};

use crate::CliError;

fn mask_value(s: &str) -> String {
    if s.chars().count() <= 2 {
        "****".to_string()
    } else {
        format!("{}****", s.chars().take(2).collect::<String>())
    }
}

/// The configuration a store command would use, given `--sqlite`.
fn effective_config(config: &DatabaseConfig, sqlite: Option<&Path>) -> DatabaseConfig {
    match sqlite {
        Some(path) => DatabaseConfig::sqlite(path),
        None => config.clone(),
    }
}

/// Show current database settings and their sources.
///
/// With `--sqlite`, the configured settings are still listed, but the
/// target is the SQLite file that store commands would open instead.
pub(crate) fn run_config_show(sqlite: Option<&Path>) -> Result<(), CliError> {
    let path = killbot_db::config_path();
    let sources = killbot_db::config_sources();

    log::info!(
        "{}",
        "Database Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    match &path {
        Some(p) if p.exists() => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(exists)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Config file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Config file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    log::info!("");

    let config = DatabaseConfig::load_unvalidated()?;
    let shown = |source: &ConfigSource, value: String, is_secret: bool| match source {
        ConfigSource::Missing => None,
        _ if is_secret => Some(mask_value(&value)),
        _ => Some(value),
    };

    let path_value = config
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let fields = [
        ("backend", &sources.backend, shown(&sources.backend, config.backend.to_string(), false)),
        ("host", &sources.host, shown(&sources.host, config.host.clone(), false)),
        ("user", &sources.user, shown(&sources.user, config.user.clone(), false)),
        ("password", &sources.password, shown(&sources.password, config.password.clone(), true)),
        ("schema", &sources.schema, shown(&sources.schema, config.schema.clone(), false)),
        ("path", &sources.path, shown(&sources.path, path_value, false)),
    ];

    for (name, source, value) in &fields {
        let source_str = format!("({})", source);
        match value {
            Some(v) => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    v,
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            None => {
                log::info!(
                    "  {} {} {}",
                    format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
                    "not set".if_supports_color(Stdout, |t| t.yellow()),
                    source_str.if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
        }
    }

    log::info!("");
    let effective = effective_config(&config, sqlite);
    match effective.validate() {
        Ok(()) => log::info!(
            "  Target: {}{}",
            effective.redacted_target().if_supports_color(Stdout, |t| t.green()),
            if sqlite.is_some() { " (--sqlite)" } else { "" },
        ),
        Err(e) => log::warn!("  {}", e),
    }
    Ok(())
}

/// Print the config file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    let path = killbot_db::config_path()
        .ok_or_else(|| CliError::config("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_two_chars() {
        assert_eq!(mask_value("hunter2"), "hu****");
        assert_eq!(mask_value("ab"), "****");
        assert_eq!(mask_value(""), "****");
    }

    #[test]
    fn sqlite_flag_replaces_target() {
        let configured = DatabaseConfig::mysql("db.internal", "killbot", "hunter2", "eve");

        let effective = effective_config(&configured, Some(Path::new("/tmp/killbot.db")));
        assert_eq!(effective.redacted_target(), "sqlite:///tmp/killbot.db");

        let effective = effective_config(&configured, None);
        assert_eq!(effective.redacted_target(), "mysql://killbot@db.internal:3306/eve");
    }
}
