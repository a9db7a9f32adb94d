use std::path::Path;

use indexmap::IndexMap;

use super::ScriptWriter;
use crate::buffer::CodeBuffer;
use crate::context::push_warning;
use crate::error::Result;
use crate::param::py_repr;
use crate::settings::{keys, UNITS_FROM_PREFS};

/// One keyword argument of the hardware server launch call.
#[derive(Debug, Clone, PartialEq)]
pub enum HubValue {
    /// Source text emitted as is.
    Raw(String),
    /// Emitted as `dict(k=v, ...)`.
    Map(IndexMap<String, String>),
}

impl HubValue {
    fn render(&self) -> String {
        match self {
            HubValue::Raw(s) => s.clone(),
            HubValue::Map(m) => {
                let items: Vec<String> = m.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("dict({})", items.join(", "))
            }
        }
    }
}

/// Ordered keyword arguments for `launchHubServer`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HubConfig {
    pub entries: IndexMap<String, HubValue>,
}

impl HubConfig {
    pub fn get(&self, key: &str) -> Option<&HubValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn raw(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), HubValue::Raw(value));
    }

    fn map(&mut self, key: &str, items: &[(&str, String)]) {
        let map = items
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        self.entries.insert(key.to_string(), HubValue::Map(map));
    }

    /// Keyword argument list, one per continuation line.
    pub fn to_kwargs(&self) -> String {
        let items: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}={}", v.render()))
            .collect();
        items.join(",\n    ")
    }
}

impl ScriptWriter<'_> {
    /// Build the launch configuration from the normalized settings.
    ///
    /// An absolute config path that does not exist is dropped with a
    /// warning; relative paths resolve against the working directory when
    /// the script runs.
    pub fn hub_config(&mut self) -> Result<HubConfig> {
        let mut config = HubConfig::default();

        let config_file = self.params.text(keys::IOHUB_CONFIG)?.to_string();
        if !config_file.is_empty() {
            if Path::new(&config_file).is_absolute() && !Path::new(&config_file).exists() {
                push_warning(
                    &mut self.warnings,
                    format!("ioHub config file does not exist: {config_file}"),
                );
            } else {
                config.raw("iohub_config_name", format!("u\"{config_file}\""));
            }
        }

        // Preference-defined units are not known here; the hardware server
        // reports in pixels instead.
        let units = match self.params.text(keys::UNITS)? {
            UNITS_FROM_PREFS => "pix",
            u => u,
        };
        config.map(
            "Display",
            &[
                ("device_number", self.plan.screen.to_string()),
                ("reporting_unit_type", py_repr(units)),
            ],
        );

        let monitor = self.params.text(keys::MONITOR)?;
        if !monitor.is_empty() {
            config.raw("psychopy_monitor_name", format!("\"{monitor}\""));
        }

        if self.params.flag(keys::USE_HDF5)? {
            config.map("experiment_info", &[("code", "expName".to_string())]);
            if self.info.contains_key("session") {
                config.map("session_info", &[("code", "expInfo.get(u'session')".to_string())]);
            }
            config.raw("datastore_name", "filename".to_string());
        }

        Ok(config)
    }

    pub(super) fn emit_iohub_launch(&mut self, buf: &mut CodeBuffer) -> Result<()> {
        let config = self.hub_config()?;
        buf.write_indented_lines(&format!(
            "\n# >> Begin Launch ioHub Server Code\n\
             \n\
             # start the ioHub Server\n\
             iohub_server = launchHubServer({})\n\
             \n\
             # << End Launch ioHub Server Code\n",
            config.to_kwargs()
        ));
        Ok(())
    }
}
