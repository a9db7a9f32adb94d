//! Everything a generation pass needs besides the Parameter Set.

use serde::{Deserialize, Serialize};

use crate::settings::BuilderPrefs;

/// Libraries every script needs because the settings component itself
/// builds a window and an info dialog.
const SETTINGS_LIBS: [&str; 2] = ["visual", "gui"];

/// Component types that need a stencil buffer (clipping aperture).
const STENCIL_COMPONENTS: [&str; 1] = ["Aperture"];

/// Component types that need the pointer regardless of full-screen mode.
const POINTER_COMPONENTS: [&str; 1] = ["RatingScale"];

/// Per-pass generation inputs.
#[derive(Debug, Clone, Default)]
pub struct GenContext {
    /// Generator version stamped into the header.
    pub version: String,
    /// Human-readable generation time stamped into the header.
    pub timestamp: String,
    /// Path of the experiment document the script was generated from.
    pub exp_path: String,
    /// Runtime libraries the host document declares, in import order.
    pub required_libs: Vec<String>,
    pub prefs: BuilderPrefs,
    pub inventory: Inventory,
}

impl GenContext {
    pub fn new(version: &str, timestamp: &str) -> Self {
        Self {
            version: version.to_string(),
            timestamp: timestamp.to_string(),
            ..Default::default()
        }
    }

    /// Declared libraries plus the ones settings require, deduplicated.
    pub fn libs(&self) -> Vec<String> {
        let mut libs: Vec<String> = Vec::with_capacity(self.required_libs.len() + 2);
        for lib in self
            .required_libs
            .iter()
            .map(String::as_str)
            .chain(SETTINGS_LIBS)
        {
            if !libs.iter().any(|l| l == lib) {
                libs.push(lib.to_string());
            }
        }
        libs
    }

    pub fn requires(&self, lib: &str) -> bool {
        self.required_libs.iter().any(|l| l == lib)
    }
}

/// Read-only view of the host document's routines and their components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub routines: Vec<Routine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Inventory {
    pub fn component_kinds(&self) -> impl Iterator<Item = &str> {
        self.routines
            .iter()
            .flat_map(|r| r.components.iter())
            .map(|c| c.kind.as_str())
    }

    /// Whether any component draws through a clipping aperture.
    pub fn needs_stencil(&self) -> bool {
        self.component_kinds().any(|k| STENCIL_COMPONENTS.contains(&k))
    }

    /// Whether any component needs the mouse pointer.
    pub fn needs_pointer(&self) -> bool {
        self.component_kinds().any(|k| POINTER_COMPONENTS.contains(&k))
    }
}

/// Record a non-fatal generation problem.
pub(crate) fn push_warning(warnings: &mut Vec<String>, msg: String) {
    log::warn!("{msg}");
    warnings.push(msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routine(kinds: &[&str]) -> Routine {
        Routine {
            name: "trial".to_string(),
            components: kinds
                .iter()
                .enumerate()
                .map(|(i, k)| ComponentRef {
                    name: format!("c{i}"),
                    kind: k.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn libs_adds_settings_requirements_once() {
        let ctx = GenContext {
            required_libs: vec!["core".into(), "gui".into(), "data".into()],
            ..Default::default()
        };
        assert_eq!(ctx.libs(), ["core", "gui", "data", "visual"]);
    }

    #[test]
    fn inventory_flags() {
        let inv = Inventory {
            routines: vec![routine(&["Text", "Keyboard"]), routine(&["Aperture"])],
        };
        assert!(inv.needs_stencil());
        assert!(!inv.needs_pointer());

        let inv = Inventory {
            routines: vec![routine(&["RatingScale"])],
        };
        assert!(inv.needs_pointer());
        assert!(!inv.needs_stencil());
    }

    #[test]
    fn inventory_deserializes_type_field() {
        let inv: Inventory = serde_json::from_str(
            r#"{"routines": [{"name": "trial", "components": [{"name": "ap", "type": "Aperture"}]}]}"#,
        )
        .unwrap();
        assert!(inv.needs_stencil());
    }
}
