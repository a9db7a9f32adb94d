//! JSON experiment document read by the CLI and the wasm entry points.
//!
//! ```json
//! {
//!   "settings": { "expName": "stroop", "fullScr": false },
//!   "prefs": { "savedDataFolder": "data" },
//!   "expPath": "/home/lab/stroop.psyexp",
//!   "requiredLibs": ["core", "data", "event", "logging"],
//!   "routines": [{ "name": "trial", "components": [{ "name": "ap", "type": "Aperture" }] }],
//!   "overrides": { "Units": "deg" }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::{GenContext, Inventory, Routine};
use crate::error::{GenError, Result};
use crate::param::Value;
use crate::settings::{BuilderPrefs, ParamSet, SettingsDefaults};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    /// Flat defaults the settings component is built from.
    pub settings: SettingsDefaults,
    pub prefs: BuilderPrefs,
    pub exp_path: String,
    pub required_libs: Vec<String>,
    pub routines: Vec<Routine>,
    /// Per-key values applied after construction, the way an editor would.
    pub overrides: IndexMap<String, Value>,
    /// Version stamped into generated headers; the crate version if absent.
    pub builder_version: Option<String>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| GenError::message(&format!("invalid experiment document: {e}")))
    }

    /// Build the Parameter Set and apply overrides. Overriding a key the
    /// set does not have is an error.
    pub fn params(&self) -> Result<ParamSet> {
        let mut set = self.settings.build(&self.prefs);
        for (key, value) in &self.overrides {
            set.set(key, value.clone())?;
        }
        Ok(set)
    }

    /// Generation context for a pass started at `timestamp`.
    pub fn context(&self, timestamp: &str) -> GenContext {
        let version = self
            .builder_version
            .as_deref()
            .unwrap_or(crate::VERSION);
        GenContext {
            exp_path: self.exp_path.clone(),
            required_libs: self.required_libs.clone(),
            prefs: self.prefs.clone(),
            inventory: Inventory {
                routines: self.routines.clone(),
            },
            ..GenContext::new(version, timestamp)
        }
    }
}
