//! The settings component's Parameter Set: construction from flat defaults,
//! lookup helpers used by both generators, and the one-time normalization
//! that runs before a generation pass.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::param::{py_repr, Category, Dialect, Param, Value, ValueKind};
use crate::parser::ExpInfo;

/// Stable parameter keys.
pub mod keys {
    pub const EXP_NAME: &str = "expName";
    pub const SHOW_INFO_DLG: &str = "Show info dlg";
    pub const ENABLE_ESCAPE: &str = "Enable Escape";
    pub const EXP_INFO: &str = "Experiment info";
    pub const USE_VERSION: &str = "Use version";
    pub const FULL_SCREEN: &str = "Full-screen window";
    pub const WINDOW_SIZE: &str = "Window size (pixels)";
    pub const SCREEN: &str = "Screen";
    pub const MONITOR: &str = "Monitor";
    pub const COLOR: &str = "color";
    pub const COLOR_SPACE: &str = "colorSpace";
    pub const UNITS: &str = "Units";
    pub const BLEND_MODE: &str = "blendMode";
    pub const SHOW_MOUSE: &str = "Show mouse";
    pub const DATA_FILENAME: &str = "Data filename";
    pub const SAVE_LOG: &str = "Save log file";
    pub const SAVE_WIDE_CSV: &str = "Save wide csv file";
    pub const SAVE_CSV: &str = "Save csv file";
    pub const SAVE_XLSX: &str = "Save excel file";
    pub const SAVE_PSYDAT: &str = "Save psydat file";
    pub const LOGGING_LEVEL: &str = "logging level";
    pub const USE_IOHUB: &str = "useIoHub";
    pub const USE_HDF5: &str = "useHDF5";
    pub const IOHUB_CONFIG: &str = "ioHubConfigFile";
    /// Legacy field from documents saved before the data-filename parameter.
    pub const SAVED_DATA_FOLDER: &str = "Saved data folder";
}

pub const COLOR_SPACES: [&str; 4] = ["rgb", "dkl", "lms", "hsv"];
pub const UNITS: [&str; 8] = [
    "use prefs",
    "deg",
    "pix",
    "cm",
    "norm",
    "height",
    "degFlatPos",
    "degFlat",
];
/// Units value that leaves the choice to the runtime's preferences.
pub const UNITS_FROM_PREFS: &str = "use prefs";
pub const UNTITLED: &str = "untitled";
pub const BLEND_MODES: [&str; 2] = ["add", "avg"];
pub const LOGGING_LEVELS: [&str; 6] = ["error", "warning", "data", "exp", "info", "debug"];

/// Keys of the experiment-info literal that name the participant, in
/// priority order.
pub const PARTICIPANT_FIELDS: [&str; 4] = ["participant", "Participant", "Subject", "Observer"];

pub const HELP_URL: &str = "http://www.psychopy.org/builder/settings.html";

/// Ordered mapping from key to [`Param`], plus the editor's display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    params: IndexMap<String, Param>,
    /// Presentation order for editors; generation never consults it.
    order: Vec<String>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, param: Param) {
        self.params.insert(key.to_string(), param);
    }

    pub fn remove(&mut self, key: &str) -> Option<Param> {
        self.params.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, key: &str) -> Result<&Param> {
        self.params.get(key).ok_or_else(|| GenError::missing_param(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Result<&mut Param> {
        self.params
            .get_mut(key)
            .ok_or_else(|| GenError::missing_param(key))
    }

    /// Editor-style mutation of an existing parameter.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.get_mut(key)?.set(value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.params.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn set_order(&mut self, order: &[&str]) {
        self.order = order.iter().map(|k| k.to_string()).collect();
    }

    /// Raw text of a text-valued parameter ("" for other values).
    pub fn text(&self, key: &str) -> Result<&str> {
        Ok(self.get(key)?.text())
    }

    /// Truthiness of a flag parameter.
    pub fn flag(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_truthy())
    }

    pub fn code(&self, key: &str, dialect: Dialect) -> Result<String> {
        Ok(self.get(key)?.to_code(dialect))
    }

    /// The experiment name binding, `'untitled'` when the name is empty.
    pub fn exp_name(&self, dialect: Dialect) -> Result<String> {
        if self.text(keys::EXP_NAME)?.is_empty() {
            Ok(Value::str(UNTITLED).literal(dialect))
        } else {
            self.code(keys::EXP_NAME, dialect)
        }
    }

    /// Validate every parameter against its allowed types and values.
    pub fn validate(&self) -> Result<()> {
        for (key, param) in &self.params {
            param.validate(key)?;
        }
        Ok(())
    }

    /// Fail if any of `keys` is absent.
    pub fn require(&self, keys: &[&str]) -> Result<()> {
        match keys.iter().find(|k| !self.contains(k)) {
            Some(missing) => Err(GenError::missing_param(missing)),
            None => Ok(()),
        }
    }
}

/// Builder-wide preferences consulted by the settings component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderPrefs {
    pub saved_data_folder: String,
}

impl Default for BuilderPrefs {
    fn default() -> Self {
        Self {
            saved_data_folder: "data".to_string(),
        }
    }
}

/// Flat named defaults a settings component is constructed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDefaults {
    pub exp_name: String,
    pub show_exp_info: bool,
    pub exp_info: String,
    pub enable_escape: bool,
    pub use_version: String,
    pub full_scr: bool,
    pub win_size: Value,
    pub screen: u32,
    pub monitor: String,
    pub color: String,
    pub color_space: String,
    pub units: String,
    pub blend_mode: String,
    pub show_mouse: bool,
    /// Data filename expression; synthesized from the builder preference when absent.
    pub filename: Option<String>,
    pub save_log_file: bool,
    #[serde(rename = "saveWideCSVFile")]
    pub save_wide_csv_file: bool,
    #[serde(rename = "saveCSVFile")]
    pub save_csv_file: bool,
    #[serde(rename = "saveXLSXFile")]
    pub save_xlsx_file: bool,
    pub save_psydat_file: bool,
    pub logging: String,
    pub use_io_hub: bool,
    #[serde(rename = "useHDF5")]
    pub use_hdf5: bool,
    pub io_hub_config_file: String,
    /// Legacy folder field; only present on old documents.
    pub saved_data_folder: Option<String>,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            exp_name: String::new(),
            show_exp_info: true,
            exp_info: "{'participant':'', 'session':'001'}".to_string(),
            enable_escape: true,
            use_version: "latest".to_string(),
            full_scr: true,
            win_size: Value::Seq(vec![Value::Num(1024.0), Value::Num(768.0)]),
            screen: 1,
            monitor: "testMonitor".to_string(),
            color: "$[0,0,0]".to_string(),
            color_space: "rgb".to_string(),
            units: "use prefs".to_string(),
            blend_mode: "avg".to_string(),
            show_mouse: false,
            filename: None,
            save_log_file: true,
            save_wide_csv_file: true,
            save_csv_file: false,
            save_xlsx_file: false,
            save_psydat_file: true,
            logging: "exp".to_string(),
            use_io_hub: false,
            use_hdf5: false,
            io_hub_config_file: "iohub_config.yaml".to_string(),
            saved_data_folder: None,
        }
    }
}

const DEFAULT_FILENAME: &str =
    "u'xxxx/%s_%s_%s' % (expInfo['participant'], expName, expInfo['date'])";

/// Editor display order.
const ORDER: [&str; 20] = [
    keys::EXP_NAME,
    keys::SHOW_INFO_DLG,
    keys::EXP_INFO,
    keys::DATA_FILENAME,
    keys::SAVE_XLSX,
    keys::SAVE_CSV,
    keys::SAVE_WIDE_CSV,
    keys::SAVE_PSYDAT,
    keys::SAVE_LOG,
    keys::LOGGING_LEVEL,
    keys::MONITOR,
    keys::SCREEN,
    keys::FULL_SCREEN,
    keys::WINDOW_SIZE,
    keys::COLOR,
    keys::COLOR_SPACE,
    keys::UNITS,
    keys::USE_IOHUB,
    keys::USE_HDF5,
    keys::IOHUB_CONFIG,
];

impl SettingsDefaults {
    /// Build the fully populated Parameter Set.
    ///
    /// When no filename is given, the default expression is rooted at the
    /// builder's saved-data folder. This substitution happens here and
    /// nowhere else.
    pub fn build(&self, prefs: &BuilderPrefs) -> ParamSet {
        use Category::*;
        use ValueKind as K;

        let mut filename = self
            .filename
            .clone()
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        if filename.starts_with("u'xxxx") {
            filename = filename.replace("xxxx", folder_or_default(&prefs.saved_data_folder));
        }

        let mut set = ParamSet::new();

        // basic
        set.insert(
            keys::EXP_NAME,
            Param::new(Value::str(&self.exp_name), K::Str, Basic)
                .hint("Name of the entire experiment (taken by default from the filename on save)")
                .label("Experiment name"),
        );
        set.insert(
            keys::SHOW_INFO_DLG,
            Param::new(self.show_exp_info.into(), K::Bool, Basic)
                .hint("Start the experiment with a dialog to set info (e.g.participant or condition)")
                .label("Show info dialog"),
        );
        set.insert(
            keys::ENABLE_ESCAPE,
            Param::new(self.enable_escape.into(), K::Bool, Basic)
                .hint("Enable the <esc> key, to allow subjects to quit / break out of the experiment")
                .label("Enable Escape key"),
        );
        set.insert(
            keys::EXP_INFO,
            Param::new(Value::str(&self.exp_info), K::Code, Basic)
                .hint("The info to present in a dialog box. Right-click to check syntax and preview the dialog box.")
                .label("Experiment info"),
        );
        set.insert(
            keys::USE_VERSION,
            Param::new(Value::str(&self.use_version), K::Str, Basic)
                .hint("The version of PsychoPy to use when running the experiment.")
                .label("Use PsychoPy version"),
        );

        // screen
        set.insert(
            keys::FULL_SCREEN,
            Param::new(self.full_scr.into(), K::Bool, Screen)
                .hint("Run the experiment full-screen (recommended)")
                .label("Full-screen window"),
        );
        set.insert(
            keys::WINDOW_SIZE,
            Param::new(self.win_size.clone(), K::Code, Screen)
                .hint("Size of window (if not fullscreen)")
                .label("Window size (pixels)"),
        );
        set.insert(
            keys::SCREEN,
            Param::new(Value::Num(f64::from(self.screen)), K::Num, Screen)
                .hint("Which physical screen to run on (1 or 2)")
                .label("Screen"),
        );
        set.insert(
            keys::MONITOR,
            Param::new(Value::str(&self.monitor), K::Str, Screen)
                .hint("Name of the monitor (from Monitor Center). Right-click to go there, then copy & paste a monitor name here.")
                .label("Monitor"),
        );
        set.insert(
            keys::COLOR,
            Param::new(Value::str(&self.color), K::Str, Screen)
                .hint("Color of the screen (e.g. black, $[1.0,1.0,1.0], $variable. Right-click to bring up a color-picker.)")
                .label("Color"),
        );
        set.insert(
            keys::COLOR_SPACE,
            Param::new(Value::str(&self.color_space), K::Str, Screen)
                .allowed_values(COLOR_SPACES)
                .hint("Needed if color is defined numerically (see PsychoPy documentation on color spaces)")
                .label("Color space"),
        );
        set.insert(
            keys::UNITS,
            Param::new(Value::str(&self.units), K::Str, Screen)
                .allowed_values(UNITS)
                .hint("Units to use for window/stimulus coordinates (e.g. cm, pix, deg)")
                .label("Units"),
        );
        set.insert(
            keys::BLEND_MODE,
            Param::new(Value::str(&self.blend_mode), K::Str, Screen)
                .allowed_values(BLEND_MODES)
                .hint("Should new stimuli be added or averaged with the stimuli that have been drawn already")
                .label("Blend mode"),
        );
        set.insert(
            keys::SHOW_MOUSE,
            Param::new(self.show_mouse.into(), K::Bool, Screen)
                .hint("Should the mouse be visible on screen?")
                .label("Show mouse"),
        );

        // data
        set.insert(
            keys::DATA_FILENAME,
            Param::new(Value::str(filename), K::Code, Data)
                .hint("Code to create your custom file name base. Don't give a file extension - this will be added.")
                .label("Data filename"),
        );
        set.insert(
            keys::SAVE_LOG,
            Param::new(self.save_log_file.into(), K::Bool, Data)
                .hint("Save a detailed log (more detailed than the excel/csv files) of the entire experiment")
                .label("Save log file"),
        );
        set.insert(
            keys::SAVE_WIDE_CSV,
            Param::new(self.save_wide_csv_file.into(), K::Bool, Data)
                .hint("Save data from loops in comma-separated-value (.csv) format for maximum portability")
                .label("Save csv file (trial-by-trial)"),
        );
        set.insert(
            keys::SAVE_CSV,
            Param::new(self.save_csv_file.into(), K::Bool, Data)
                .hint("Save data from loops in comma-separated-value (.csv) format for maximum portability")
                .label("Save csv file (summaries)"),
        );
        set.insert(
            keys::SAVE_XLSX,
            Param::new(self.save_xlsx_file.into(), K::Bool, Data)
                .hint("Save data from loops in Excel (.xlsx) format")
                .label("Save excel file"),
        );
        set.insert(
            keys::SAVE_PSYDAT,
            Param::new(self.save_psydat_file.into(), K::Bool, Data)
                .hint("Save data from loops in psydat format. This is useful for python programmers to generate analysis scripts.")
                .label("Save psydat file"),
        );
        set.insert(
            keys::LOGGING_LEVEL,
            Param::new(Value::str(&self.logging), K::Code, Data)
                .allowed_values(LOGGING_LEVELS)
                .hint("How much output do you want in the log files? ('error' is fewest messages, 'debug' is most)")
                .label("Logging level"),
        );

        // ioHub
        set.insert(
            keys::USE_IOHUB,
            Param::new(self.use_io_hub.into(), K::Bool, IoHub)
                .allowed_values([true, false])
                .hint("Start ioHub for advanced hardware polling")
                .label("Use ioHub"),
        );
        set.insert(
            keys::USE_HDF5,
            Param::new(self.use_hdf5.into(), K::Bool, IoHub)
                .allowed_values([true, false])
                .hint("Save data from ioHub using std file name")
                .label("Save HDF5 file"),
        );
        set.insert(
            keys::IOHUB_CONFIG,
            Param::new(Value::str(&self.io_hub_config_file), K::Str, IoHub)
                .hint("Config files contain info about your set up")
                .label("Config file (yaml)"),
        );

        if let Some(folder) = &self.saved_data_folder {
            set.insert(
                keys::SAVED_DATA_FOLDER,
                Param::new(Value::str(folder), K::Str, Data).label("Saved data folder"),
            );
        }

        set.set_order(&ORDER);
        set
    }
}

fn folder_or_default(folder: &str) -> &str {
    match folder.trim() {
        "" => "data",
        f => f,
    }
}

/// Folder that default data filenames are rooted at: the legacy field if
/// present and non-blank, else the builder preference, else `data`.
pub fn save_data_dir(params: &ParamSet, pref_folder: &str) -> String {
    let legacy = params
        .get(keys::SAVED_DATA_FOLDER)
        .map(|p| p.text().trim())
        .unwrap_or("");
    if legacy.is_empty() {
        folder_or_default(pref_folder).to_string()
    } else {
        legacy.to_string()
    }
}

/// Normalize a Parameter Set before generation, returning the normalized copy.
///
/// - The legacy saved-data-folder field is folded into the data filename
///   (participant-like info key if one exists, else timestamp only) and
///   removed.
/// - An empty data filename becomes a timestamped default.
/// - Experiment info is rewritten as a braced literal if it was not one.
///
/// Running this on its own output changes nothing.
pub fn normalize(params: &ParamSet, info: &ExpInfo, pref_folder: &str) -> Result<ParamSet> {
    params.require(&[keys::DATA_FILENAME, keys::EXP_INFO])?;
    let mut out = params.clone();
    let dir = py_repr(&save_data_dir(params, pref_folder));

    if out.remove(keys::SAVED_DATA_FOLDER).is_some() {
        let filename = match info.first_key_of(&PARTICIPANT_FIELDS) {
            Some(field) => format!(
                "{dir} + os.sep + '%s_%s' % (expInfo['{field}'], expInfo['date'])"
            ),
            None => format!("{dir} + os.path.sep + expInfo['date']"),
        };
        log::debug!("migrated legacy '{}' into data filename", keys::SAVED_DATA_FOLDER);
        out.set(keys::DATA_FILENAME, Value::code(filename))?;
    }

    if out.text(keys::DATA_FILENAME)?.is_empty() {
        out.set(
            keys::DATA_FILENAME,
            Value::code(format!("{dir} + os.sep + u'psychopy_data_' + data.getDateStr()")),
        )?;
    }

    let literal = info.to_literal();
    if out.text(keys::EXP_INFO)?.trim() != literal {
        out.set(keys::EXP_INFO, Value::code(literal))?;
    }

    Ok(out)
}
