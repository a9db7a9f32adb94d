pub mod buffer;
pub mod codegen;
pub mod context;
pub mod display;
pub mod document;
pub mod error;
pub mod lexer;
pub mod param;
pub mod parser;
pub mod runtime;
pub mod settings;
pub mod token;
pub mod window;

#[cfg(feature = "wasm")]
pub mod wasm;

use context::GenContext;
use display::DisplayQuery;
use document::Document;
use error::Result;
use runtime::TemplateSource;
use settings::ParamSet;

/// Version stamped into generated headers when the document names none.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Both programs from one generation pass.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Synchronous Python script.
    pub script: String,
    /// Browser page with the asynchronous experiment script inline.
    pub browser: String,
    /// The normalized Parameter Set both programs were generated from.
    pub params: ParamSet,
    pub warnings: Vec<String>,
}

/// Generate both targets from one Parameter Set.
///
/// The script pass normalizes the set and plans the window; the browser
/// pass reuses both, so the two programs open the same window with the same
/// settings. Any fatal error aborts the pass and no text is returned.
pub fn generate_both(
    params: &ParamSet,
    ctx: &GenContext,
    displays: &dyn DisplayQuery,
    templates: &dyn TemplateSource,
) -> Result<Generated> {
    let script = codegen::generate_script(params, ctx, displays)?;
    let browser = runtime::write_browser(&script.params, &script.plan, templates)?;
    Ok(Generated {
        script: script.code,
        browser,
        params: script.params,
        warnings: script.warnings,
    })
}

/// Generate both targets from a JSON experiment document.
pub fn generate_document(
    source: &str,
    timestamp: &str,
    displays: &dyn DisplayQuery,
    templates: &dyn TemplateSource,
) -> Result<Generated> {
    let doc = Document::from_json(source)?;
    let params = doc.params()?;
    generate_both(&params, &doc.context(timestamp), displays, templates)
}
