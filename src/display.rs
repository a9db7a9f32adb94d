//! Physical display queries, injected so generation runs without a
//! windowing context.

use thiserror::Error;

/// Display count assumed when the toolkit cannot be asked.
pub const FALLBACK_DISPLAY_COUNT: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum DisplayError {
    #[error("no display context available")]
    Unavailable,
    #[error("display {0} does not exist")]
    NoSuchDisplay(usize),
}

/// Capability to ask the windowing toolkit about attached displays.
pub trait DisplayQuery {
    /// Number of attached displays.
    fn count(&self) -> Result<usize, DisplayError>;
    /// Pixel size of the display at a 0-based index.
    fn geometry(&self, index: usize) -> Result<(u32, u32), DisplayError>;
}

/// A fixed list of display sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedDisplays {
    pub sizes: Vec<(u32, u32)>,
}

impl FixedDisplays {
    pub fn new(sizes: Vec<(u32, u32)>) -> Self {
        Self { sizes }
    }
}

impl DisplayQuery for FixedDisplays {
    fn count(&self) -> Result<usize, DisplayError> {
        Ok(self.sizes.len())
    }

    fn geometry(&self, index: usize) -> Result<(u32, u32), DisplayError> {
        self.sizes
            .get(index)
            .copied()
            .ok_or(DisplayError::NoSuchDisplay(index))
    }
}

/// No windowing context: every query fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl DisplayQuery for Headless {
    fn count(&self) -> Result<usize, DisplayError> {
        Err(DisplayError::Unavailable)
    }

    fn geometry(&self, _index: usize) -> Result<(u32, u32), DisplayError> {
        Err(DisplayError::Unavailable)
    }
}

/// Display count, or [`FALLBACK_DISPLAY_COUNT`] when the query fails.
pub fn display_count(displays: &dyn DisplayQuery) -> usize {
    displays.count().unwrap_or_else(|e| {
        log::debug!("display count unavailable ({e}), assuming {FALLBACK_DISPLAY_COUNT}");
        FALLBACK_DISPLAY_COUNT
    })
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_geometry(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(|c: char| c == 'x' || c == 'X')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}
