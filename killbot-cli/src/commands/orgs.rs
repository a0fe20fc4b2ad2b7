use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use killbot_core::{EventCategory, Organization};
use killbot_db::{RelationalStore, SaveOutcome};

use crate::CliError;

fn print_organization(org: &Organization) {
    let id = org.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    log::info!(
        "{} {} {}",
        format!("#{}", id).if_supports_color(Stdout, |t| t.bold()),
        org.display_name(),
        format!("(corp {})", org.external_id).if_supports_color(Stdout, |t| t.dimmed()),
    );
    for &category in EventCategory::all() {
        log::info!(
            "  {} {}",
            format!("last {}:", category).if_supports_color(Stdout, |t| t.cyan()),
            org.cursor(category),
        );
    }
}

/// Render organizations as pretty JSON.
fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::other(format!("Failed to serialize organizations: {}", e)))
}

/// List all tracked organizations.
pub(crate) fn run_orgs_list(store: &RelationalStore, json: bool) -> Result<(), CliError> {
    let orgs = store.load_all_organizations()?;
    if json {
        println!("{}", to_json(&orgs)?);
        return Ok(());
    }
    if orgs.is_empty() {
        log::info!(
            "{}",
            "No organizations tracked".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    for org in &orgs {
        print_organization(org);
        if !org.ignored_regions.is_empty() {
            log::info!(
                "  {} {}",
                "ignored regions:".if_supports_color(Stdout, |t| t.cyan()),
                org.ignored_regions.len(),
            );
        }
    }
    log::info!("");
    log::info!("{} organization(s)", orgs.len());
    Ok(())
}

/// Show one organization, including comments and ignored regions.
pub(crate) fn run_orgs_show(store: &RelationalStore, id: i64, json: bool) -> Result<(), CliError> {
    let org = store.load_organization(id)?;
    if json {
        println!("{}", to_json(&org)?);
        return Ok(());
    }
    print_organization(&org);

    for &category in EventCategory::all() {
        let comment = org.comment(category);
        if !comment.is_empty() {
            log::info!(
                "  {} {}",
                format!("{} comment:", category).if_supports_color(Stdout, |t| t.cyan()),
                comment,
            );
        }
    }

    if org.ignored_regions.is_empty() {
        log::info!(
            "  {}",
            "No ignored regions".if_supports_color(Stdout, |t| t.dimmed()),
        );
    } else {
        let regions: Vec<String> = org.ignored_regions.iter().map(|r| r.to_string()).collect();
        log::info!(
            "  {} {}",
            "ignored regions:".if_supports_color(Stdout, |t| t.cyan()),
            regions.join(", "),
        );
    }
    Ok(())
}

/// Start tracking a new organization.
pub(crate) fn run_orgs_add(
    store: &RelationalStore,
    external_id: i64,
    last_kill: i64,
    last_loss: i64,
) -> Result<(), CliError> {
    if external_id <= 0 {
        return Err(CliError::other(format!(
            "Invalid corporation ID: {}",
            external_id
        )));
    }

    let mut org = Organization::new(external_id);
    org.last_kill_id = last_kill;
    org.last_loss_id = last_loss;

    match store.save_organization(&mut org)? {
        SaveOutcome::Inserted { id } => {
            log::info!(
                "{} corporation {} as #{}",
                "Added".if_supports_color(Stdout, |t| t.green()),
                external_id,
                id,
            );
            Ok(())
        }
        SaveOutcome::Updated => Err(CliError::database(
            "New organization was updated instead of inserted",
        )),
    }
}

/// Move an organization's cursors.
///
/// Without `force`, a cursor only moves forward; requests to move it back
/// are reported and skipped.
pub(crate) fn run_orgs_set_cursors(
    store: &RelationalStore,
    id: i64,
    kill: Option<i64>,
    loss: Option<i64>,
    force: bool,
) -> Result<(), CliError> {
    if kill.is_none() && loss.is_none() {
        return Err(CliError::other("Nothing to do: pass --kill and/or --loss"));
    }

    let mut org = store.load_organization(id)?;
    let mut changed = false;

    for (category, requested) in [(EventCategory::Kill, kill), (EventCategory::Loss, loss)] {
        let Some(event_id) = requested else {
            continue;
        };
        let current = org.cursor(category);
        if force {
            match category {
                EventCategory::Kill => org.last_kill_id = event_id,
                EventCategory::Loss => org.last_loss_id = event_id,
            }
            changed |= current != event_id;
        } else if org.advance_cursor(category, event_id) {
            changed = true;
        } else if event_id < current {
            log::warn!(
                "Not moving {} cursor back from {} to {} (use --force)",
                category,
                current,
                event_id,
            );
        }
    }

    if !changed {
        log::info!("{}", "Cursors unchanged".if_supports_color(Stdout, |t| t.dimmed()));
        return Ok(());
    }

    store.save_organization(&mut org)?;
    log::info!("{}", "Updated".if_supports_color(Stdout, |t| t.green()));
    print_organization(&org);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use killbot_core::IgnoredRegion;

    #[test]
    fn organization_json_lists_regions_as_ids() {
        let mut org = Organization::new(98765);
        org.id = Some(3);
        org.last_kill_id = 42;
        org.ignored_regions = vec![IgnoredRegion(10000002), IgnoredRegion(10000003)];

        let json: serde_json::Value = serde_json::from_str(&to_json(&org).unwrap()).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["external_id"], 98765);
        assert_eq!(json["last_kill_id"], 42);
        assert_eq!(json["ignored_regions"], serde_json::json!([10000002, 10000003]));
    }

    #[test]
    fn unsaved_organization_has_null_id() {
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&[Organization::new(1)]).unwrap()).unwrap();
        assert!(json[0]["id"].is_null());
    }
}
