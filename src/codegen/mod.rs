//! Script target: a synchronous Python program that bootstraps, runs and
//! tears down an experiment session.
//!
//! Phases are written in a fixed order by [`ScriptWriter`]:
//! init (header, version pin, imports) → start → window → [component
//! bodies, written by other components] → end.

use crate::buffer::CodeBuffer;
use crate::context::GenContext;
use crate::display::DisplayQuery;
use crate::error::{GenError, Result};
use crate::parser::ExpInfo;
use crate::settings::{self, keys, ParamSet};
use crate::window::WindowPlan;

mod end;
mod header;
mod iohub;
mod start;
mod window;

#[cfg(test)]
mod tests;

pub use self::iohub::{HubConfig, HubValue};

// ── Public types ───────────────────────────────────────────────────────

/// A generated script plus what the pass learned along the way.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub code: String,
    /// The normalized Parameter Set the script was generated from.
    pub params: ParamSet,
    /// Window decisions, reused by the browser target.
    pub plan: WindowPlan,
    /// Non-fatal issues the user should know about.
    pub warnings: Vec<String>,
}

/// Keys the script target reads. All must exist before generation.
pub const REQUIRED_KEYS: [&str; 24] = [
    keys::EXP_NAME,
    keys::SHOW_INFO_DLG,
    keys::ENABLE_ESCAPE,
    keys::EXP_INFO,
    keys::USE_VERSION,
    keys::FULL_SCREEN,
    keys::WINDOW_SIZE,
    keys::SCREEN,
    keys::MONITOR,
    keys::COLOR,
    keys::COLOR_SPACE,
    keys::UNITS,
    keys::BLEND_MODE,
    keys::SHOW_MOUSE,
    keys::DATA_FILENAME,
    keys::SAVE_LOG,
    keys::SAVE_WIDE_CSV,
    keys::SAVE_CSV,
    keys::SAVE_XLSX,
    keys::SAVE_PSYDAT,
    keys::LOGGING_LEVEL,
    keys::USE_IOHUB,
    keys::USE_HDF5,
    keys::IOHUB_CONFIG,
];

// ── Public API ─────────────────────────────────────────────────────────

/// Generate the complete script with no component bodies.
pub fn generate_script(
    params: &ParamSet,
    ctx: &GenContext,
    displays: &dyn DisplayQuery,
) -> Result<ScriptOutput> {
    let mut writer = ScriptWriter::new(params, ctx, displays)?;
    let mut buf = CodeBuffer::new();

    writer.write_init_code(&mut buf)?;
    writer.write_start_code(&mut buf)?;
    writer.write_window_code(&mut buf)?;
    writer.write_end_code(&mut buf)?;

    let (params, plan, warnings) = writer.finish();
    Ok(ScriptOutput {
        code: buf.into_string(),
        params,
        plan,
        warnings,
    })
}

// ── ScriptWriter ───────────────────────────────────────────────────────

/// Writes the settings component's phases of the script target.
///
/// Construction validates the Parameter Set, parses the experiment info,
/// normalizes the set and plans the window, so every phase reads the same
/// immutable state.
pub struct ScriptWriter<'a> {
    pub(super) params: ParamSet,
    pub(super) info: ExpInfo,
    pub(super) plan: WindowPlan,
    pub(super) ctx: &'a GenContext,
    pub(super) warnings: Vec<String>,
}

impl<'a> ScriptWriter<'a> {
    pub fn new(params: &ParamSet, ctx: &'a GenContext, displays: &dyn DisplayQuery) -> Result<Self> {
        params.require(&REQUIRED_KEYS)?;
        params.validate()?;

        let info = parse_exp_info(params.text(keys::EXP_INFO)?)?;
        let params = settings::normalize(params, &info, &ctx.prefs.saved_data_folder)?;

        let mut warnings = Vec::new();
        let plan = WindowPlan::resolve(&params, &ctx.inventory, displays, &mut warnings)?;

        Ok(Self {
            params,
            info,
            plan,
            ctx,
            warnings,
        })
    }

    /// The normalized Parameter Set.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn plan(&self) -> &WindowPlan {
        &self.plan
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Header, version pin and imports.
    pub fn write_init_code(&mut self, buf: &mut CodeBuffer) -> Result<()> {
        self.emit_header(buf);
        self.emit_use_version(buf)?;
        self.emit_imports(buf)
    }

    /// Session metadata, data path, optional hardware bootstrap.
    pub fn write_start_code(&mut self, buf: &mut CodeBuffer) -> Result<()> {
        self.emit_session_info(buf)?;
        self.emit_data_filename(buf)?;
        self.emit_experiment_handler(buf)?;
        self.emit_logging(buf)?;
        if self.params.flag(keys::USE_IOHUB)? {
            self.emit_iohub_launch(buf)?;
        }
        if self.params.flag(keys::ENABLE_ESCAPE)? {
            buf.write_indented_lines(
                "\nendExpNow = False  # flag for 'escape' or other condition => quit the exp\n",
            );
        }
        Ok(())
    }

    pub fn write_window_code(&mut self, buf: &mut CodeBuffer) -> Result<()> {
        self.emit_window(buf)?;
        if self.ctx.requires("microphone") {
            buf.write_indented_lines("\n# Enable sound input/output:\nmicrophone.switchOn()\n");
        }
        self.emit_frame_rate(buf);
        Ok(())
    }

    pub fn write_end_code(&mut self, buf: &mut CodeBuffer) -> Result<()> {
        self.emit_end(buf)
    }

    /// Hand back the normalized set, the window plan and accumulated warnings.
    pub fn finish(self) -> (ParamSet, WindowPlan, Vec<String>) {
        (self.params, self.plan, self.warnings)
    }
}

/// Parse the experiment-info text, which must be a dictionary literal.
pub fn parse_exp_info(text: &str) -> Result<ExpInfo> {
    ExpInfo::parse(text).map_err(|e| {
        log::error!("syntax error in \"Experiment info\" settings (expected a dict)");
        GenError::invalid_exp_info(e)
    })
}
