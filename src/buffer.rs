/// Append-only, indentation-aware text sink that generators write into.
///
/// The indent level is set directly rather than pushed and popped; one
/// level is four spaces.
#[derive(Debug, Clone, Default)]
pub struct CodeBuffer {
    output: String,
    indent: usize,
}

const ONE_INDENT: &str = "    ";

impl CodeBuffer {
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(8192),
            indent: 0,
        }
    }

    pub fn indent_level(&self) -> usize {
        self.indent
    }

    /// Set the indent level, or shift it when `relative` is true.
    /// Relative shifts saturate at zero.
    pub fn set_indent_level(&mut self, level: isize, relative: bool) {
        let base = if relative { self.indent as isize } else { 0 };
        self.indent = (base + level).max(0) as usize;
    }

    /// Append text exactly as given.
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Append text prefixed by the current indent.
    pub fn write_indented(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str(ONE_INDENT);
        }
        self.output.push_str(text);
    }

    /// Append each line of `text` at the current indent. Blank lines stay
    /// bare; every line, including the last, ends with a newline.
    pub fn write_indented_lines(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.blank();
            } else {
                self.line(line);
            }
        }
    }

    /// One indented line.
    pub fn line(&mut self, s: &str) {
        self.write_indented(s);
        self.output.push('\n');
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(self) -> String {
        self.output
    }
}
