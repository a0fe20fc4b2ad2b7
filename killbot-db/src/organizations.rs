//! Loading and saving organizations (the `corporations` table).

use killbot_core::{IgnoredRegion, Organization};

use crate::error::StoreError;
use crate::store::RelationalStore;
use crate::value::{RowRef, Value};

const SELECT_ORGANIZATION: &str = "SELECT id, evecorporationid, lastkillid, lastlossid, name, killcomment, losscomment FROM corporations";

/// What `save_organization` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new row was created with this identifier.
    Inserted { id: i64 },
    /// The existing row was updated.
    Updated,
}

impl RelationalStore {
    /// Load every organization with its ignored regions.
    ///
    /// Order is whatever the table yields. If any region lookup fails the
    /// whole result is discarded.
    pub fn load_all_organizations(&self) -> Result<Vec<Organization>, StoreError> {
        let rows = self.query(SELECT_ORGANIZATION, &[])?;
        let mut organizations = rows
            .rows()
            .map(row_to_organization)
            .collect::<Result<Vec<_>, _>>()?;

        for org in &mut organizations {
            if let Some(id) = org.id {
                org.ignored_regions = self.load_ignored_regions_for_organization(id)?;
            }
        }

        Ok(organizations)
    }

    /// Load one organization by its internal ID.
    pub fn load_organization(&self, id: i64) -> Result<Organization, StoreError> {
        let mut org = self.query_one(
            &format!("{} WHERE id=?", SELECT_ORGANIZATION),
            &[Value::from(id)],
            "organization",
            id,
            row_to_organization,
        )?;
        org.ignored_regions = self.load_ignored_regions_for_organization(id)?;
        Ok(org)
    }

    /// Region IDs the organization ignores; empty when there are none.
    pub fn load_ignored_regions_for_organization(
        &self,
        id: i64,
    ) -> Result<Vec<IgnoredRegion>, StoreError> {
        let rows = self.query(
            "SELECT regionid FROM ignoredregions WHERE corporationID=?",
            &[Value::from(id)],
        )?;
        rows.rows()
            .map(|row| row.get::<i64>("regionid").map(IgnoredRegion))
            .collect()
    }

    /// Persist an organization.
    ///
    /// An organization without an ID is inserted and receives the generated
    /// ID; one with an ID has its external ID and cursors updated. Name,
    /// comments and ignored regions are never written here.
    ///
    /// There is no locking: two callers that load, change and save the same
    /// organization concurrently will lose one of the updates.
    pub fn save_organization(&self, org: &mut Organization) -> Result<SaveOutcome, StoreError> {
        match org.id {
            Some(_) => {
                self.update_organization(org)?;
                Ok(SaveOutcome::Updated)
            }
            None => {
                let id = self.insert_organization(org)?;
                org.id = Some(id);
                Ok(SaveOutcome::Inserted { id })
            }
        }
    }

    /// Insert a new organization row and return its generated ID.
    ///
    /// Does not modify `org`; `save_organization` writes the ID back.
    pub fn insert_organization(&self, org: &Organization) -> Result<i64, StoreError> {
        let result = self.connection()?.execute(
            "INSERT INTO corporations(evecorporationid, lastkillid, lastlossid) VALUES(?, ?, ?)",
            &[
                Value::from(org.external_id),
                Value::from(org.last_kill_id),
                Value::from(org.last_loss_id),
            ],
        )?;
        if result.last_insert_id <= 0 {
            return Err(StoreError::MissingInsertId);
        }

        log::debug!(
            "Inserted organization {} (external id {})",
            result.last_insert_id,
            org.external_id
        );
        Ok(result.last_insert_id)
    }

    /// Update the external ID and cursors of a saved organization.
    ///
    /// Matching zero rows is not an error; MySQL reports zero affected rows
    /// when the values are unchanged.
    pub fn update_organization(&self, org: &Organization) -> Result<(), StoreError> {
        let id = org.id.ok_or(StoreError::NotPersisted)?;
        let result = self.connection()?.execute(
            "UPDATE corporations SET evecorporationid=?, lastkillid=?, lastlossid=? WHERE id=?",
            &[
                Value::from(org.external_id),
                Value::from(org.last_kill_id),
                Value::from(org.last_loss_id),
                Value::from(id),
            ],
        )?;

        log::debug!(
            "Updated organization {} (kill cursor {}, loss cursor {}, {} row(s))",
            id,
            org.last_kill_id,
            org.last_loss_id,
            result.rows_affected
        );
        Ok(())
    }
}

fn row_to_organization(row: RowRef<'_>) -> Result<Organization, StoreError> {
    Ok(Organization {
        id: Some(row.get("id")?),
        external_id: row.get("evecorporationid")?,
        last_kill_id: row.get("lastkillid")?,
        last_loss_id: row.get("lastlossid")?,
        name: row.get::<Option<String>>("name")?.unwrap_or_default(),
        kill_comment: row.get::<Option<String>>("killcomment")?.unwrap_or_default(),
        loss_comment: row.get::<Option<String>>("losscomment")?.unwrap_or_default(),
        ignored_regions: Vec::new(),
    })
}
