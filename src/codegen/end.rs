use super::ScriptWriter;
use crate::buffer::CodeBuffer;
use crate::error::Result;
use crate::settings::keys;

impl ScriptWriter<'_> {
    // ── End phase ──────────────────────────────────────────────────────

    /// Explicit saves per format flag, then teardown. The handler is
    /// aborted so it does not save a second time at interpreter exit.
    pub(super) fn emit_end(&self, buf: &mut CodeBuffer) -> Result<()> {
        buf.line("# these shouldn't be strictly necessary (should auto-save)");
        if self.params.flag(keys::SAVE_WIDE_CSV)? {
            buf.line("thisExp.saveAsWideText(filename+'.csv')");
        }
        if self.params.flag(keys::SAVE_PSYDAT)? {
            buf.line("thisExp.saveAsPickle(filename)");
        }
        if self.params.flag(keys::SAVE_LOG)? {
            buf.line("logging.flush()");
        }

        let mut code = String::from(
            "# make sure everything is closed down\n\
             thisExp.abort()  # or data files will save again on exit\n\
             win.close()\n",
        );
        if self.params.flag(keys::USE_IOHUB)? {
            code.push_str("iohub_server.quit()\n");
        }
        code.push_str("core.quit()\n");
        buf.write_indented_lines(&code);
        Ok(())
    }
}
