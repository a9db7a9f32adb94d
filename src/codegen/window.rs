use super::ScriptWriter;
use crate::buffer::CodeBuffer;
use crate::error::Result;
use crate::param::{Dialect, Value};
use crate::settings::keys;

fn py_bool(b: bool) -> String {
    Value::Bool(b).literal(Dialect::Python)
}

impl ScriptWriter<'_> {
    // ── Window phase ───────────────────────────────────────────────────

    pub(super) fn emit_window(&self, buf: &mut CodeBuffer) -> Result<()> {
        buf.write_indented_lines("\n# Setup the Window\n");

        let plan = &self.plan;
        buf.write_indented(&format!(
            "win = visual.Window(\n    size={}, fullscr={}, screen={},\n    allowGUI={}, allowStencil={},\n",
            plan.size.to_code(Dialect::Python),
            py_bool(plan.full_screen),
            plan.screen,
            py_bool(plan.allow_gui),
            py_bool(plan.allow_stencil),
        ));

        let p = |key: &str| self.params.code(key, Dialect::Python);
        let mut code = format!(
            "    monitor={}, color={}, colorSpace={},\n",
            p(keys::MONITOR)?,
            p(keys::COLOR)?,
            p(keys::COLOR_SPACE)?
        );
        if !self.params.text(keys::BLEND_MODE)?.is_empty() {
            code.push_str(&format!("    blendMode={}, useFBO=True,\n", p(keys::BLEND_MODE)?));
        }
        if let Some(units) = &plan.units {
            code.push_str(&format!("    units={}", units.to_code(Dialect::Python)));
        }
        let code = code.trim_end_matches(|c: char| c == ',' || c == ' ' || c == '\n');
        buf.write_indented_lines(&format!("{code})\n"));
        Ok(())
    }

    /// Measured frame rate with a 60 Hz guess when measurement fails.
    pub(super) fn emit_frame_rate(&self, buf: &mut CodeBuffer) {
        buf.write_indented_lines(
            "# store frame rate of monitor if we can measure it\n\
             expInfo['frameRate'] = win.getActualFrameRate()\n\
             if expInfo['frameRate'] != None:\n\
             \x20   frameDur = 1.0 / round(expInfo['frameRate'])\n\
             else:\n\
             \x20   frameDur = 1.0 / 60.0  # could not measure, so guess\n",
        );
    }
}
