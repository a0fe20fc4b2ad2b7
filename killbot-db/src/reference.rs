//! Lookups against the static game data tables.

use crate::error::StoreError;
use crate::store::RelationalStore;
use crate::value::Value;

/// Region ID callers fall back to when a solar system lookup fails.
pub const INVALID_REGION_ID: i64 = -1;

impl RelationalStore {
    /// Display name of a ship type.
    pub fn query_ship_name(&self, ship_type_id: i64) -> Result<String, StoreError> {
        self.query_one(
            "SELECT typeName FROM invTypes WHERE typeID=?",
            &[Value::from(ship_type_id)],
            "ship type",
            ship_type_id,
            |row| row.get("typeName"),
        )
    }

    /// Region containing a solar system.
    ///
    /// Unknown systems are `NotFound`; use
    /// `.unwrap_or(INVALID_REGION_ID)` where a sentinel is wanted.
    pub fn query_region_id(&self, solar_system_id: i64) -> Result<i64, StoreError> {
        self.query_one(
            "SELECT regionID FROM mapSolarSystems WHERE solarSystemID=?",
            &[Value::from(solar_system_id)],
            "solar system",
            solar_system_id,
            |row| row.get("regionID"),
        )
    }
}
