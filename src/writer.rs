//! Line-oriented output buffer for the code generator.
//!
//! The writer owns all indentation bookkeeping so generation strategies never
//! concatenate whitespace by hand. Output is a flat list of lines; the final
//! text is produced once at the end of generation.

use crate::error::CompileResult;

const DEFAULT_INDENT_UNIT: &str = "  ";

// ═══════════════════════════════════════════════════════════════════════════════
// INDENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct IndentationManager {
    level: usize,
    unit: String,
}

impl Default for IndentationManager {
    fn default() -> Self {
        Self {
            level: 0,
            unit: DEFAULT_INDENT_UNIT.to_string(),
        }
    }
}

impl IndentationManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(unit: impl Into<String>) -> Self {
        Self {
            level: 0,
            unit: unit.into(),
        }
    }

    pub fn increase(&mut self) {
        self.level += 1;
    }

    pub fn decrease(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Leading whitespace for the current level.
    pub fn padding(&self) -> String {
        self.unit.repeat(self.level)
    }

    /// Column width of the current padding, in characters.
    pub fn columns(&self) -> usize {
        self.level * self.unit.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WRITER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct CodeWriter {
    lines: Vec<String>,
    indent: IndentationManager,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent_unit(unit: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            indent: IndentationManager::with_unit(unit),
        }
    }

    /// Write one line at the current indentation. Empty text produces a
    /// blank line with no trailing whitespace.
    pub fn write_line(&mut self, text: &str) {
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", self.indent.padding(), text));
        }
    }

    /// Write raw text spanning multiple lines, re-indenting each line
    /// relative to the current level.
    pub fn write_text(&mut self, text: &str) {
        for line in text.lines() {
            self.write_line(line.trim_end());
        }
    }

    pub fn blank_line(&mut self) {
        self.lines.push(String::new());
    }

    /// Raw indentation control for emitters that interleave writes to the
    /// writer with other context state. Prefer `indented`, which restores
    /// the level on every exit path by itself.
    pub fn indent_increase(&mut self) {
        self.indent.increase();
    }

    pub fn indent_decrease(&mut self) {
        self.indent.decrease();
    }

    /// Run `f` one indentation level deeper. The level is restored on every
    /// exit path, unwinding included, so neither an error nor a panic
    /// mid-generation can skew the indentation of whatever is emitted
    /// afterwards.
    pub fn indented<F>(&mut self, f: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        struct Guard<'a> {
            writer: &'a mut CodeWriter,
        }
        impl Drop for Guard<'_> {
            fn drop(&mut self) {
                self.writer.indent.decrease();
            }
        }

        self.indent.increase();
        let guard = Guard { writer: self };
        f(&mut *guard.writer)
    }

    /// `open` line, indented body, `close` line.
    pub fn block<F>(&mut self, open: &str, close: &str, f: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.write_line(open);
        self.indented(f)?;
        self.write_line(close);
        Ok(())
    }

    /// `if (cond) { body }`.
    pub fn if_block<F>(&mut self, condition: &str, f: F) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.block(&format!("if ({}) {{", condition), "}", f)
    }

    /// `if (cond) { then } else { otherwise }`.
    pub fn if_else_block<F, G>(&mut self, condition: &str, then: F, otherwise: G) -> CompileResult<()>
    where
        F: FnOnce(&mut Self) -> CompileResult<()>,
        G: FnOnce(&mut Self) -> CompileResult<()>,
    {
        self.write_line(&format!("if ({}) {{", condition));
        self.indented(then)?;
        self.write_line("} else {");
        self.indented(otherwise)?;
        self.write_line("}");
        Ok(())
    }

    /// Zero-based index of the next line to be written. Generated positions
    /// in source maps are taken from this before the line is emitted.
    pub fn next_line(&self) -> usize {
        self.lines.len()
    }

    /// Column at which the next line's text will start.
    pub fn next_column(&self) -> usize {
        self.indent.columns()
    }

    pub fn indent_level(&self) -> usize {
        self.indent.level()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Final output text, newline-terminated when non-empty.
    pub fn finish(self) -> String {
        if self.lines.is_empty() {
            String::new()
        } else {
            let mut out = self.lines.join("\n");
            out.push('\n');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;

    #[test]
    fn test_indented_block() {
        let mut w = CodeWriter::new();
        w.block("function f() {", "}", |w| {
            w.write_line("return 1;");
            Ok(())
        })
        .unwrap();
        assert_eq!(w.finish(), "function f() {\n  return 1;\n}\n");
    }

    #[test]
    fn test_if_else_block() {
        let mut w = CodeWriter::new();
        w.if_else_block(
            "x > 0",
            |w| {
                w.write_line("a();");
                Ok(())
            },
            |w| {
                w.write_line("b();");
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(w.finish(), "if (x > 0) {\n  a();\n} else {\n  b();\n}\n");
    }

    #[test]
    fn test_indent_restored_on_error() {
        let mut w = CodeWriter::new();
        let result = w.indented(|w| {
            w.write_line("inside");
            Err(CompileError::transform("Component", "boom"))
        });
        assert!(result.is_err());
        assert_eq!(w.indent_level(), 0);
        w.write_line("after");
        assert_eq!(w.finish(), "  inside\nafter\n");
    }

    #[test]
    fn test_indent_restored_on_panic() {
        let mut w = CodeWriter::new();
        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = w.indented(|w| {
                w.write_line("inside");
                panic!("mid-generation")
            });
        }));
        assert!(unwound.is_err());
        assert_eq!(w.indent_level(), 0);
        w.write_line("after");
        assert_eq!(w.finish(), "  inside\nafter\n");
    }

    #[test]
    fn test_blank_line_has_no_padding() {
        let mut w = CodeWriter::new();
        w.indented(|w| {
            w.write_line("");
            w.blank_line();
            Ok(())
        })
        .unwrap();
        assert_eq!(w.finish(), "\n\n");
    }

    #[test]
    fn test_multiline_text_reindented() {
        let mut w = CodeWriter::new();
        w.indented(|w| {
            w.write_text("line1\n  line2");
            Ok(())
        })
        .unwrap();
        assert_eq!(w.finish(), "  line1\n    line2\n");
    }

    #[test]
    fn test_next_line_and_column_track_output() {
        let mut w = CodeWriter::new();
        assert_eq!(w.next_line(), 0);
        w.write_line("a");
        assert_eq!(w.next_line(), 1);
        w.indented(|w| {
            assert_eq!(w.next_column(), 2);
            w.write_line("b");
            Ok(())
        })
        .unwrap();
        assert_eq!(w.next_line(), 2);
        assert_eq!(w.next_column(), 0);
    }
}
