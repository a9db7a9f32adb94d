//! Browser target: an HTML page whose inline script runs the experiment
//! asynchronously.
//!
//! This module is split into:
//! - `templates`: fragment loading (built in, or from a directory)
//! - `render`: placeholder substitution inside fragments
//! - `browser`: page assembly in init, window and end order

mod browser;
mod render;
mod templates;

pub use browser::{generate_browser, write_browser, BrowserOutput};
pub use render::{render, Scope};
pub use templates::{BuiltinTemplates, DirTemplates, TemplateSource, HTML_HEADER, SETUP_EXP, WIN_INIT};
