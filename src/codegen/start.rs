use super::ScriptWriter;
use crate::buffer::CodeBuffer;
use crate::error::Result;
use crate::param::{py_repr, Dialect};
use crate::settings::keys;

impl ScriptWriter<'_> {
    // ── Start phase ────────────────────────────────────────────────────

    pub(super) fn emit_session_info(&self, buf: &mut CodeBuffer) -> Result<()> {
        buf.write_indented_lines(
            "# Ensure that relative paths start from the same directory as this script\n\
             _thisDir = os.path.dirname(os.path.abspath(__file__)).decode(sys.getfilesystemencoding())\n\
             os.chdir(_thisDir)\n\
             \n\
             # Store info about the experiment session\n",
        );

        let name = self.params.exp_name(Dialect::Python)?;
        if self.params.text(keys::EXP_NAME)?.is_empty() {
            buf.line(&format!("expName = {name}"));
        } else {
            buf.line(&format!(
                "expName = {name}  # from the Builder filename that created this script"
            ));
        }

        buf.line(&format!("expInfo = {}", self.info.to_literal()));
        if self.params.flag(keys::SHOW_INFO_DLG)? {
            buf.write_indented_lines(
                "dlg = gui.DlgFromDict(dictionary=expInfo, title=expName)\n\
                 if dlg.OK == False:\n    core.quit()  # user pressed cancel\n",
            );
        }
        buf.write_indented_lines(
            "expInfo['date'] = data.getDateStr()  # add a simple timestamp\n\
             expInfo['expName'] = expName\n",
        );
        Ok(())
    }

    /// The filename stem. Relative expressions are rooted at the script's
    /// own directory.
    pub(super) fn emit_data_filename(&self, buf: &mut CodeBuffer) -> Result<()> {
        buf.write_indented_lines(
            "\n# Data file name stem = absolute path + name; later add .psyexp, .csv, .log, etc\n",
        );
        let filename = self.params.code(keys::DATA_FILENAME, Dialect::Python)?;
        if is_absolute_expr(&filename) {
            buf.line(&format!("filename = {filename}"));
        } else {
            buf.line(&format!("filename = _thisDir + os.sep + {filename}"));
        }
        Ok(())
    }

    pub(super) fn emit_experiment_handler(&self, buf: &mut CodeBuffer) -> Result<()> {
        buf.write_indented_lines(&format!(
            "\n# An ExperimentHandler isn't essential but helps with data saving\n\
             thisExp = data.ExperimentHandler(name=expName, version='',\n\
             \x20   extraInfo=expInfo, runtimeInfo=None,\n\
             \x20   originPath={origin},\n\
             \x20   savePickle={pickle}, saveWideText={wide},\n\
             \x20   dataFileName=filename)\n",
            origin = py_repr(&self.ctx.exp_path),
            pickle = self.params.code(keys::SAVE_PSYDAT, Dialect::Python)?,
            wide = self.params.code(keys::SAVE_WIDE_CSV, Dialect::Python)?,
        ));
        Ok(())
    }

    /// File log at the chosen level; the console stays at warning level
    /// whatever the file verbosity.
    pub(super) fn emit_logging(&self, buf: &mut CodeBuffer) -> Result<()> {
        if self.params.flag(keys::SAVE_LOG)? {
            let level = self.params.text(keys::LOGGING_LEVEL)?.to_uppercase();
            buf.write_indented_lines(&format!(
                "# save a log file for detail verbose info\n\
                 logFile = logging.LogFile(filename+'.log', level=logging.{level})\n"
            ));
        }
        buf.line("logging.console.setLevel(logging.WARNING)  # this outputs to the screen, not a file");
        Ok(())
    }
}

/// Whether a filename expression already names an absolute path: a quoted
/// literal (optionally prefixed) starting at a filesystem root or a drive.
pub(super) fn is_absolute_expr(expr: &str) -> bool {
    let mut s = expr.trim_start();
    if let Some(rest) = s.strip_prefix(|c: char| matches!(c, 'u' | 'U' | 'r' | 'R' | 'b' | 'B')) {
        if rest.starts_with(|c: char| c == '\'' || c == '"') {
            s = rest;
        }
    }
    let s = s.trim_start_matches(|c: char| c == '\'' || c == '"');

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some('/' | '\\'), _) => true,
        (Some(drive), Some(':')) => drive.is_ascii_alphabetic(),
        _ => false,
    }
}
