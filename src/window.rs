//! Window geometry and capability decisions, made once per pass and shared
//! by both targets so they open the same window.

use crate::context::{push_warning, Inventory};
use crate::display::{display_count, DisplayQuery};
use crate::error::{GenError, Result};
use crate::param::{Dialect, Param, Value};
use crate::settings::{keys, ParamSet, UNITS_FROM_PREFS};

#[derive(Debug, Clone, PartialEq)]
pub enum WindowSize {
    /// Pixel size reported for the chosen display.
    Display(u32, u32),
    /// The explicit window-size parameter.
    Param(Param),
}

impl WindowSize {
    pub fn to_code(&self, dialect: Dialect) -> String {
        match self {
            WindowSize::Display(w, h) => match dialect {
                Dialect::Python => format!("({w}, {h})"),
                Dialect::JavaScript => format!("[{w}, {h}]"),
            },
            WindowSize::Param(p) => p.to_code(dialect),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowPlan {
    pub full_screen: bool,
    pub size: WindowSize,
    /// 0-based display index.
    pub screen: usize,
    pub allow_gui: bool,
    pub allow_stencil: bool,
    /// `None` leaves the units to the runtime's preferences.
    pub units: Option<Param>,
}

impl WindowPlan {
    /// Decide window parameters.
    ///
    /// Full screen hides the pointer unless "Show mouse" is set, and any
    /// pointer-driven component forces it back on. The 1-based requested
    /// screen falls back to the first display when it does not exist.
    pub fn resolve(
        params: &ParamSet,
        inventory: &Inventory,
        displays: &dyn DisplayQuery,
        warnings: &mut Vec<String>,
    ) -> Result<Self> {
        let full_screen = params.flag(keys::FULL_SCREEN)?;
        let mut allow_gui = !full_screen || params.flag(keys::SHOW_MOUSE)?;
        let allow_stencil = inventory.needs_stencil();
        if inventory.needs_pointer() {
            allow_gui = true;
        }

        let screen = resolve_screen(params, displays, warnings)?;

        let size = if full_screen {
            match displays.geometry(screen) {
                Ok((w, h)) => WindowSize::Display(w, h),
                Err(e) => {
                    push_warning(
                        warnings,
                        format!(
                            "Could not read the size of screen {} ({e}). Writing script using the window size setting.",
                            screen + 1
                        ),
                    );
                    WindowSize::Param(params.get(keys::WINDOW_SIZE)?.clone())
                }
            }
        } else {
            WindowSize::Param(params.get(keys::WINDOW_SIZE)?.clone())
        };

        let units = params.get(keys::UNITS)?;
        let units = (units.text() != UNITS_FROM_PREFS).then(|| units.clone());

        Ok(Self {
            full_screen,
            size,
            screen,
            allow_gui,
            allow_stencil,
            units,
        })
    }
}

/// The requested 1-based screen as a 0-based index, or 0 with a warning
/// when the display does not exist.
pub fn resolve_screen(
    params: &ParamSet,
    displays: &dyn DisplayQuery,
    warnings: &mut Vec<String>,
) -> Result<usize> {
    let requested = requested_screen(params.get(keys::SCREEN)?)?;
    let available = display_count(displays);

    if requested < 1 || requested as usize > available {
        push_warning(
            warnings,
            "Requested screen can't be found. Writing script using first available screen."
                .to_string(),
        );
        Ok(0)
    } else {
        Ok(requested as usize - 1)
    }
}

fn requested_screen(param: &Param) -> Result<i64> {
    let parsed = match &param.value {
        Value::Num(n) if n.fract() == 0.0 => Some(*n as i64),
        Value::Str(s) | Value::Code(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        GenError::message(&format!(
            "parameter '{}' must be a whole number, got {}",
            keys::SCREEN,
            param.value
        ))
    })
}
