use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use killbot_db::{RelationalStore, Value};

use crate::CliError;

/// Print the name of a ship type.
pub(crate) fn run_ship(store: &RelationalStore, type_id: i64) -> Result<(), CliError> {
    let name = store.query_ship_name(type_id)?;
    log::info!(
        "{} {}",
        format!("{}:", type_id).if_supports_color(Stdout, |t| t.cyan()),
        name,
    );
    Ok(())
}

/// Print the region a solar system belongs to.
pub(crate) fn run_region(store: &RelationalStore, solar_system_id: i64) -> Result<(), CliError> {
    let region_id = store.query_region_id(solar_system_id)?;
    log::info!(
        "{} region {}",
        format!("{}:", solar_system_id).if_supports_color(Stdout, |t| t.cyan()),
        region_id,
    );
    Ok(())
}

/// Run an ad-hoc SELECT and print the rows as pretty JSON on stdout.
pub(crate) fn run_query(
    store: &RelationalStore,
    sql: &str,
    params: &[String],
) -> Result<(), CliError> {
    let params: Vec<Value> = params.iter().map(|p| parse_param(p)).collect();
    let rows = store.raw_query(sql, &params)?;
    let json = serde_json::to_string_pretty(&rows)
        .map_err(|e| CliError::other(format!("Failed to serialize rows: {}", e)))?;
    println!("{}", json);
    log::debug!("{} row(s)", rows.len());
    Ok(())
}

/// Integers first, then floats; anything else binds as text.
fn parse_param(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        Value::Integer(n)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_prefer_integers() {
        assert_eq!(parse_param("30000142"), Value::Integer(30000142));
        assert_eq!(parse_param("-7"), Value::Integer(-7));
        assert_eq!(parse_param("0.5"), Value::Float(0.5));
        assert_eq!(parse_param("Jita"), Value::Text("Jita".to_string()));
        assert_eq!(parse_param(""), Value::Text(String::new()));
    }

    #[test]
    fn query_prints_rows() {
        let store = killbot_db::open_memory().unwrap();
        run_query(&store, "SELECT ? AS n", &["1".to_string()]).unwrap();
    }
}
