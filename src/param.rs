//! Parameters: typed, labeled value slots shared by the editor and the
//! generators.
//!
//! A [`Param`] is the contract between whoever edits the settings and the
//! code generators. Its [`Value`] carries a type tag, and rendering a value
//! into target source text is a pure function of that tag, the declared
//! [`ValueKind`], and the target [`Dialect`].

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, GenError, Result};

/// Raw editable content of a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Num(f64),
    Seq(Vec<Value>),
    Str(String),
    /// A code expression. Never produced by deserialization; text values
    /// for code-kind parameters are retagged by [`Value::coerce`].
    #[serde(skip_deserializing)]
    Code(String),
}

/// How a parameter's value is interpreted when emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Str,
    Code,
    Bool,
    Num,
}

/// Editor grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Basic,
    Screen,
    Data,
    #[serde(rename = "ioHub")]
    IoHub,
}

/// Target language of a generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Synchronous Python script.
    Python,
    /// Browser JavaScript.
    JavaScript,
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn code(s: impl Into<String>) -> Self {
        Value::Code(s.into())
    }

    /// The kind this value naturally has.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Num(_) => ValueKind::Num,
            Value::Str(_) => ValueKind::Str,
            Value::Code(_) | Value::Seq(_) => ValueKind::Code,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Num(_) => "number",
            Value::Seq(_) => "sequence",
            Value::Str(_) => "string",
            Value::Code(_) => "code",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Code(s) => Some(s),
            _ => None,
        }
    }

    /// Python truthiness, used for flag parameters.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0,
            Value::Seq(items) => !items.is_empty(),
            Value::Str(s) | Value::Code(s) => !s.is_empty(),
        }
    }

    /// Allowed-value comparison. Text compares by content regardless of the
    /// string/code tag.
    pub fn matches(&self, other: &Value) -> bool {
        match (self.as_text(), other.as_text()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }

    /// Retag text so it agrees with a parameter's declared kind. Flag text
    /// spelled as a boolean literal becomes a real boolean.
    pub fn coerce(self, kind: ValueKind) -> Self {
        match (self, kind) {
            (Value::Str(s), ValueKind::Code) => Value::Code(s),
            (Value::Code(s), ValueKind::Str) => Value::Str(s),
            (Value::Str(s) | Value::Code(s), ValueKind::Bool) => match s.trim() {
                "True" | "true" => Value::Bool(true),
                "False" | "false" => Value::Bool(false),
                _ => Value::Str(s),
            },
            (v, _) => v,
        }
    }

    /// Render as a literal of the target language.
    pub fn literal(&self, dialect: Dialect) -> String {
        match self {
            Value::Bool(b) => match (dialect, b) {
                (Dialect::Python, true) => "True".to_string(),
                (Dialect::Python, false) => "False".to_string(),
                (Dialect::JavaScript, b) => b.to_string(),
            },
            Value::Num(n) => format_num(*n),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.literal(dialect)).collect();
                match dialect {
                    Dialect::Python if parts.len() == 1 => format!("({},)", parts[0]),
                    Dialect::Python => format!("({})", parts.join(", ")),
                    Dialect::JavaScript => format!("[{}]", parts.join(", ")),
                }
            }
            Value::Str(s) => quote(s, dialect),
            Value::Code(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.literal(Dialect::Python))
    }
}

/// A typed, labeled value slot with validation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub value: Value,
    pub kind: ValueKind,
    /// Acceptable value kinds; empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_types: Vec<ValueKind>,
    /// Closed set of legal values; empty means unrestricted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,
    pub category: Category,
    pub hint: String,
    pub label: String,
}

impl Param {
    /// Flag parameters only accept booleans; other kinds are unrestricted
    /// until [`Param::allowed_types`] says otherwise.
    pub fn new(value: Value, kind: ValueKind, category: Category) -> Self {
        let allowed_types = match kind {
            ValueKind::Bool => vec![ValueKind::Bool],
            _ => Vec::new(),
        };
        Self {
            value: value.coerce(kind),
            kind,
            allowed_types,
            allowed_values: Vec::new(),
            category,
            hint: String::new(),
            label: String::new(),
        }
    }

    pub fn allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn allowed_types(mut self, kinds: &[ValueKind]) -> Self {
        self.allowed_types = kinds.to_vec();
        self
    }

    pub fn hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Replace the value, retagging text to this parameter's kind.
    pub fn set(&mut self, value: Value) {
        self.value = value.coerce(self.kind);
    }

    pub fn text(&self) -> &str {
        self.value.as_text().unwrap_or("")
    }

    pub fn is_truthy(&self) -> bool {
        self.value.is_truthy()
    }

    /// Check the value against the allowed types and the allowed values.
    pub fn validate(&self, key: &str) -> Result<()> {
        if !self.allowed_types.is_empty() && !self.allowed_types.contains(&self.value.kind()) {
            return Err(ErrorKind::DisallowedType {
                key: key.to_string(),
                kind: self.value.type_name().to_string(),
            }
            .into());
        }
        if !self.allowed_values.is_empty()
            && !self.allowed_values.iter().any(|v| v.matches(&self.value))
        {
            let allowed: Vec<String> = self.allowed_values.iter().map(|v| v.to_string()).collect();
            return Err(GenError::from(ErrorKind::DisallowedValue {
                key: key.to_string(),
                value: self.value.to_string(),
                allowed: allowed.join(", "),
            }));
        }
        Ok(())
    }

    /// Render the value as source text of the target language.
    ///
    /// String-kind text is quoted unless it starts with `$`, which marks
    /// code. Code-kind text is emitted raw, minus any leading `$`.
    pub fn to_code(&self, dialect: Dialect) -> String {
        match (&self.value, self.kind) {
            (Value::Str(s), ValueKind::Str) => match s.strip_prefix('$') {
                Some(code) => code.to_string(),
                None => quote(s, dialect),
            },
            (Value::Str(s) | Value::Code(s), _) => s.strip_prefix('$').unwrap_or(s).to_string(),
            (value, _) => value.literal(dialect),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

fn format_num(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn quote(s: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Python => py_repr(s),
        Dialect::JavaScript => js_str(s),
    }
}

/// Quote text the way Python's `repr` does for a str.
pub fn py_repr(s: &str) -> String {
    let q = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(q);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == q => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(q);
    out
}

/// Single-quoted JS string literal. Also escapes `</` so the literal can
/// sit inside an inline `<script>` block.
pub fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '/' if prev == '<' => out.push_str("\\/"),
            c => out.push(c),
        }
        prev = c;
    }
    out.push('\'');
    out
}
