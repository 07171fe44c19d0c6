//! Ordered sink for generated DDL and warning comments

use std::io::Write;

use crate::error::Result;

/// One line of generated output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlLine {
    /// A `;`-terminated statement
    Statement(String),
    /// A `--` comment addressed to whoever reviews the script
    Comment(String),
}

impl DdlLine {
    pub fn text(&self) -> &str {
        match self {
            DdlLine::Statement(sql) | DdlLine::Comment(sql) => sql,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, DdlLine::Statement(_))
    }
}

/// Collects statements and comments in generation order
#[derive(Debug, Clone, Default)]
pub struct DdlEmitter {
    lines: Vec<DdlLine>,
}

impl DdlEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement; a trailing `;` is added when missing
    pub fn statement(&mut self, sql: impl Into<String>) {
        let mut sql = sql.into();
        if !sql.ends_with(';') {
            sql.push(';');
        }
        self.lines.push(DdlLine::Statement(sql));
    }

    /// Append a `-- WARNING:` comment
    pub fn warning(&mut self, message: impl AsRef<str>) {
        self.comment(format!("WARNING: {}", message.as_ref()));
    }

    /// Append a `--` comment
    pub fn comment(&mut self, text: impl AsRef<str>) {
        self.lines.push(DdlLine::Comment(format!("-- {}", text.as_ref())));
    }

    /// Move every line of `other` to the end of this emitter
    pub fn append(&mut self, other: &mut DdlEmitter) {
        self.lines.append(&mut other.lines);
    }

    pub fn lines(&self) -> &[DdlLine] {
        &self.lines
    }

    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|line| line.is_statement())
            .map(DdlLine::text)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render the script, one line per entry
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line.text());
            out.push('\n');
        }
        out
    }

    /// Write the rendered script to a sink
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_order() {
        let mut out = DdlEmitter::new();
        out.warning("careful");
        out.statement("ALTER TABLE public.t DROP COLUMN IF EXISTS c");
        out.comment("trailing note");

        assert_eq!(
            out.render(),
            "-- WARNING: careful\nALTER TABLE public.t DROP COLUMN IF EXISTS c;\n-- trailing note\n"
        );
        assert_eq!(out.statements().count(), 1);
    }

    #[test]
    fn write_to_buffer() {
        let mut out = DdlEmitter::new();
        out.statement("SELECT 1;");
        let mut buf = Vec::new();
        out.write_to(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "SELECT 1;\n");
    }
}
