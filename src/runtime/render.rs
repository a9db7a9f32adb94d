//! Fragment rendering.
//!
//! Fragments are plain text with placeholders:
//!
//! - `{params[<key>]}`: the parameter's value as browser source text
//! - `{window[<key>]}`: a resolved window decision (`size`, `fullscr`,
//!   `screen`, `allowGUI`, `allowStencil`, `units`); units left to the
//!   runtime's preferences render as `undefined`
//! - `{session[expName]}`: the experiment name binding, `'untitled'` when
//!   the name is empty
//!
//! `{{` and `}}` stand for literal braces. Anything else inside braces is an
//! error, as is a reference to a key that does not exist.

use crate::error::{GenError, Result};
use crate::param::{Dialect, Value};
use crate::settings::ParamSet;
use crate::window::WindowPlan;

/// What placeholders can refer to.
pub struct Scope<'a> {
    pub params: &'a ParamSet,
    pub window: &'a WindowPlan,
}

impl Scope<'_> {
    fn resolve(&self, fragment: &str, field: &str) -> Result<String> {
        let (namespace, key) = field
            .split_once('[')
            .and_then(|(ns, rest)| Some((ns, rest.strip_suffix(']')?)))
            .ok_or_else(|| {
                GenError::template(fragment, format!("malformed placeholder {{{field}}}"))
            })?;

        match namespace {
            "params" => self
                .params
                .code(key, Dialect::JavaScript)
                .map_err(|_| GenError::template(fragment, format!("unknown parameter '{key}'"))),
            "window" => self.window_field(key).ok_or_else(|| {
                GenError::template(fragment, format!("unknown window field '{key}'"))
            }),
            "session" if key == "expName" => self.params.exp_name(Dialect::JavaScript),
            "session" => Err(GenError::template(
                fragment,
                format!("unknown session field '{key}'"),
            )),
            other => Err(GenError::template(
                fragment,
                format!("unknown namespace '{other}'"),
            )),
        }
    }

    fn window_field(&self, key: &str) -> Option<String> {
        let js_bool = |b: bool| Value::Bool(b).literal(Dialect::JavaScript);
        let w = self.window;
        Some(match key {
            "size" => w.size.to_code(Dialect::JavaScript),
            "fullscr" => js_bool(w.full_screen),
            "screen" => w.screen.to_string(),
            "allowGUI" => js_bool(w.allow_gui),
            "allowStencil" => js_bool(w.allow_stencil),
            "units" => match &w.units {
                Some(units) => units.to_code(Dialect::JavaScript),
                None => "undefined".to_string(),
            },
            _ => return None,
        })
    }
}

/// Substitute every placeholder in `template`. `name` only labels errors.
pub fn render(name: &str, template: &str, scope: &Scope) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(i) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..i]);
        let tail = &rest[i..];

        if let Some(r) = tail.strip_prefix("{{") {
            out.push('{');
            rest = r;
        } else if let Some(r) = tail.strip_prefix("}}") {
            out.push('}');
            rest = r;
        } else if tail.starts_with('}') {
            return Err(GenError::template(name, "single '}' encountered"));
        } else {
            let end = tail
                .find('}')
                .ok_or_else(|| GenError::template(name, "unterminated placeholder"))?;
            out.push_str(&scope.resolve(name, &tail[1..end])?);
            rest = &tail[end + 1..];
        }
    }

    out.push_str(rest);
    Ok(out)
}
