// Indent-aware line emitter

use crate::config::Config;
use crate::rules::indent_string;

/// Collects generated source one line at a time.
///
/// Callers give the nesting depth of every line; the emitter owns the
/// indent width. Text containing newlines is split and each piece is
/// indented at the same depth. Empty lines never carry indentation.
#[derive(Debug, Clone)]
pub struct Emitter {
    indent_size: usize,
    output: String,
}

impl Emitter {
    pub fn new(config: &Config) -> Self {
        Self::with_indent(config.indent_size)
    }

    pub fn with_indent(indent_size: usize) -> Self {
        Self {
            indent_size,
            output: String::new(),
        }
    }

    /// Emit `text` at nesting level `depth`
    pub fn write(&mut self, depth: usize, text: &str) {
        for line in text.split('\n') {
            if line.is_empty() {
                self.output.push('\n');
            } else {
                self.output.push_str(&indent_string(depth, self.indent_size));
                self.output.push_str(line);
                self.output.push('\n');
            }
        }
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    pub fn indent_size(&self) -> usize {
        self.indent_size
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Get emitted output
    pub fn output(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_at_depth() {
        let mut emitter = Emitter::with_indent(3);
        emitter.write(0, "module foo");
        emitter.write(1, "implicit none");
        emitter.write(2, "x = 1");
        assert_eq!(emitter.output(), "module foo\n   implicit none\n      x = 1\n");
    }

    #[test]
    fn test_multiline_text() {
        let mut emitter = Emitter::with_indent(2);
        emitter.write(1, "\nimplicit none\nprivate\n");
        assert_eq!(emitter.output(), "\n  implicit none\n  private\n\n");
    }

    #[test]
    fn test_blank_has_no_indent() {
        let mut emitter = Emitter::new(&Config::default());
        emitter.write(3, "");
        emitter.blank();
        assert_eq!(emitter.as_str(), "\n\n");
    }
}
