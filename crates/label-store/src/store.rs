//! Typed view of the settings table.
//!
//! Each [`Settings`] field is stored under its serialized (camelCase) name
//! with a JSON-encoded value, so rows survive field additions and removals.

use dotmatrix_engine::Settings;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{Database, Result, StoreError};

/// Loads and saves [`Settings`] through a [`Database`].
#[derive(Clone)]
pub struct SettingsStore {
    db: Database,
}

impl SettingsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Stored values merged over the defaults, one key at a time.
    ///
    /// Unknown keys and values the model rejects are skipped with a warning.
    pub fn load(&self) -> Result<Settings> {
        let stored = self.db.get_all_settings()?;
        let mut merged = settings_object(&Settings::default())?;

        let mut keys: Vec<&String> = stored.keys().collect();
        keys.sort();

        for key in keys {
            if !merged.contains_key(key) {
                warn!(key = %key, "Ignoring unknown stored setting");
                continue;
            }
            let value: Value = match serde_json::from_str(&stored[key]) {
                Ok(v) => v,
                Err(e) => {
                    warn!(key = %key, error = %e, "Stored setting is not valid JSON");
                    continue;
                }
            };

            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value);
            match serde_json::from_value::<Settings>(Value::Object(candidate.clone())) {
                Ok(_) => merged = candidate,
                Err(e) => warn!(key = %key, error = %e, "Stored setting rejected, using default"),
            }
        }

        debug!(stored = stored.len(), "Loaded settings");
        Ok(serde_json::from_value(Value::Object(merged))?)
    }

    /// Write every field in one transaction.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let encoded: Vec<(String, String)> = settings_object(settings)?
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        self.db
            .update_settings_bulk(encoded.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        debug!(fields = encoded.len(), "Saved settings");
        Ok(())
    }

    /// Validate and store a single field. Returns the settings it produces.
    pub fn set_field(&self, key: &str, value: Value) -> Result<Settings> {
        let updated = apply_field(&self.load()?, key, value.clone())?;
        self.db.set_setting(key, &value.to_string())?;
        debug!(key, value = %value, "Updated setting");
        Ok(updated)
    }

    /// Drop every stored value so the defaults apply again.
    pub fn reset(&self) -> Result<()> {
        let removed = self.db.clear_settings()?;
        info!(removed, "Settings reset to defaults");
        Ok(())
    }
}

/// Return `settings` with one serialized field replaced, validated.
pub fn apply_field(settings: &Settings, key: &str, value: Value) -> Result<Settings> {
    let invalid = |reason: String| StoreError::InvalidSetting {
        key: key.to_string(),
        reason,
    };

    let mut map = settings_object(settings)?;
    if !map.contains_key(key) {
        return Err(invalid("unknown setting".into()));
    }
    map.insert(key.to_string(), value);

    let updated: Settings =
        serde_json::from_value(Value::Object(map)).map_err(|e| invalid(e.to_string()))?;
    updated.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(updated)
}

fn settings_object(settings: &Settings) -> Result<Map<String, Value>> {
    match serde_json::to_value(settings)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidSetting {
            key: String::new(),
            reason: format!("settings serialized to non-object {other}"),
        }),
    }
}
