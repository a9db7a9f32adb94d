//! Loading the browser target's boilerplate fragments by name.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::{ErrorKind, GenError, Result};

/// Page header, up to the opening of the ready callback.
pub const HTML_HEADER: &str = "JS_htmlHeader.txt";
/// Session setup inside the ready callback.
pub const SETUP_EXP: &str = "JS_setupExp.txt";
/// Window construction.
pub const WIN_INIT: &str = "JS_winInit.txt";

/// Something that can hand out a fragment by name.
///
/// A missing fragment is an error, never an empty string.
pub trait TemplateSource {
    fn load(&self, name: &str) -> Result<Cow<'_, str>>;
}

/// Fragments compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn load(&self, name: &str) -> Result<Cow<'_, str>> {
        let text = match name {
            HTML_HEADER => include_str!("../../templates/JS_htmlHeader.txt"),
            SETUP_EXP => include_str!("../../templates/JS_setupExp.txt"),
            WIN_INIT => include_str!("../../templates/JS_winInit.txt"),
            _ => return Err(missing(name)),
        };
        Ok(Cow::Borrowed(text))
    }
}

/// Fragments read from a directory, one file per name.
#[derive(Debug, Clone)]
pub struct DirTemplates {
    pub root: PathBuf,
}

impl DirTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateSource for DirTemplates {
    fn load(&self, name: &str) -> Result<Cow<'_, str>> {
        let path = self.root.join(name);
        log::debug!("loading fragment {}", path.display());
        std::fs::read_to_string(&path)
            .map(Cow::Owned)
            .map_err(|e| {
                log::error!("cannot read fragment {}: {e}", path.display());
                missing(name)
            })
    }
}

fn missing(name: &str) -> GenError {
    ErrorKind::MissingTemplate(name.to_string()).into()
}
