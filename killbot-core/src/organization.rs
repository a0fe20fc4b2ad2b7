use std::fmt;

use serde::Serialize;

/// A region identifier an organization does not want notifications for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IgnoredRegion(pub i64);

impl IgnoredRegion {
    pub fn region_id(&self) -> i64 {
        self.0
    }
}

impl From<i64> for IgnoredRegion {
    fn from(region_id: i64) -> Self {
        Self(region_id)
    }
}

impl fmt::Display for IgnoredRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of an engagement an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// The organization scored the kill.
    Kill,
    /// The organization lost the ship.
    Loss,
}

impl EventCategory {
    pub fn all() -> &'static [EventCategory] {
        &[Self::Kill, Self::Loss]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Kill => "kill",
            Self::Loss => "loss",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An in-game corporation whose kills and losses are tracked.
///
/// `id` is the storage-assigned identifier and stays `None` until the
/// organization is first saved. `external_id` comes from the game's own
/// API and must not change once set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: Option<i64>,
    pub external_id: i64,
    /// Last kill event processed for this organization.
    pub last_kill_id: i64,
    /// Last loss event processed for this organization.
    pub last_loss_id: i64,
    pub name: String,
    pub kill_comment: String,
    pub loss_comment: String,
    pub ignored_regions: Vec<IgnoredRegion>,
}

impl Organization {
    /// A new, unsaved organization with both cursors at zero.
    pub fn new(external_id: i64) -> Self {
        Self {
            external_id,
            ..Self::default()
        }
    }

    /// Whether the organization has a storage-assigned identifier.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn cursor(&self, category: EventCategory) -> i64 {
        match category {
            EventCategory::Kill => self.last_kill_id,
            EventCategory::Loss => self.last_loss_id,
        }
    }

    /// Move the cursor for `category` to `event_id`.
    ///
    /// Cursors only move forward; returns `false` and leaves the cursor
    /// alone when `event_id` is not newer than the current value.
    pub fn advance_cursor(&mut self, category: EventCategory, event_id: i64) -> bool {
        let cursor = match category {
            EventCategory::Kill => &mut self.last_kill_id,
            EventCategory::Loss => &mut self.last_loss_id,
        };
        if event_id <= *cursor {
            return false;
        }
        *cursor = event_id;
        true
    }

    /// The message prefix configured for events of `category`.
    pub fn comment(&self, category: EventCategory) -> &str {
        match category {
            EventCategory::Kill => &self.kill_comment,
            EventCategory::Loss => &self.loss_comment,
        }
    }

    pub fn ignores_region(&self, region_id: i64) -> bool {
        self.ignored_regions.iter().any(|r| r.0 == region_id)
    }

    /// Name for display, falling back to the external ID when no name is stored.
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            format!("Corporation #{}", self.external_id)
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
#[path = "tests/organization_tests.rs"]
mod tests;
