//! Browser target: an asynchronous page built from the three fragments.
//!
//! The Parameter Set is expected to be normalized already. No migration or
//! experiment-info parsing happens here.

use super::render::{render, Scope};
use super::templates::{TemplateSource, HTML_HEADER, SETUP_EXP, WIN_INIT};
use crate::buffer::CodeBuffer;
use crate::context::GenContext;
use crate::display::DisplayQuery;
use crate::error::Result;
use crate::settings::{keys, ParamSet};
use crate::window::WindowPlan;

/// Indent level of code inside the page's ready callback.
const BODY_INDENT: isize = 4;

const QUIT_FUNCTION: &str = "\nfunction quitPsychoJS() {\n    win.close()\n    core.quit();\n    return QUIT;\n}";

const FOOTER: &str = "\n        run();\n        }\n      });\n    </script>\n\n  </body>\n</html>";

/// Keys needed to plan the window when no script pass has done it.
const WINDOW_KEYS: [&str; 4] = [
    keys::FULL_SCREEN,
    keys::SHOW_MOUSE,
    keys::SCREEN,
    keys::WINDOW_SIZE,
];

#[derive(Debug, Clone)]
pub struct BrowserOutput {
    pub code: String,
    pub warnings: Vec<String>,
}

/// Generate the page on its own, planning the window from scratch.
pub fn generate_browser(
    params: &ParamSet,
    ctx: &GenContext,
    displays: &dyn DisplayQuery,
    templates: &dyn TemplateSource,
) -> Result<BrowserOutput> {
    params.require(&WINDOW_KEYS)?;
    params.validate()?;

    let mut warnings = Vec::new();
    let plan = WindowPlan::resolve(params, &ctx.inventory, displays, &mut warnings)?;
    let code = write_browser(params, &plan, templates)?;
    Ok(BrowserOutput { code, warnings })
}

/// Generate the page from an existing window plan, so it matches a script
/// generated in the same pass.
pub fn write_browser(
    params: &ParamSet,
    plan: &WindowPlan,
    templates: &dyn TemplateSource,
) -> Result<String> {
    let scope = Scope {
        params,
        window: plan,
    };
    let fragment = |name: &str| -> Result<String> {
        let text = templates.load(name)?;
        render(name, &text, &scope)
    };

    let mut buf = CodeBuffer::new();

    // init
    buf.write(&fragment(HTML_HEADER)?);
    buf.set_indent_level(BODY_INDENT, false);
    buf.write_indented_lines(&fragment(SETUP_EXP)?);

    // window
    buf.write_indented_lines(&fragment(WIN_INIT)?);

    // end
    buf.write_indented_lines(QUIT_FUNCTION);
    buf.write(FOOTER);

    log::debug!("browser target: {} bytes", buf.as_str().len());
    Ok(buf.into_string())
}
