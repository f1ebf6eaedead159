use std::io::{self, Write};

/// Options for one unified-diff rendering.
///
/// File names and dates only show up in the `---`/`+++` header, and the
/// header is only written when at least one file name is non-empty. Dates
/// are separated from the name by a tab and omitted entirely when empty.
#[derive(Debug, Clone)]
pub struct Unified {
    pub from_file: String,
    pub from_date: String,
    pub to_file: String,
    pub to_date: String,
    /// Terminator for the control lines; body lines carry their own.
    /// An empty value falls back to `"\n"`.
    pub eol: String,
    /// Unchanged lines kept around each change. `None` renders the whole
    /// input as a single hunk.
    pub context: Option<usize>,
}

impl Default for Unified {
    fn default() -> Self {
        Unified {
            from_file: String::new(),
            from_date: String::new(),
            to_file: String::new(),
            to_date: String::new(),
            eol: "\n".to_string(),
            context: Some(3),
        }
    }
}

/// Per-category write hooks, bound once per render call.
///
/// The renderer hands every physical line to the hook of its category,
/// prefix (`' '`, `'-'`, `'+'`) already attached; implementations wrap the
/// write, e.g. with color escapes, and must not alter the line content.
/// `update` receives the `+` lines of a replace step, so replacements can
/// be told apart from pure insertions; `other` is never produced by the
/// renderer and exists for callers pushing their own lines through the
/// same hook set.
pub trait LineStyle {
    fn equal(&mut self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        out.write_all(line.as_bytes())
    }

    fn delete(&mut self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        out.write_all(line.as_bytes())
    }

    fn insert(&mut self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        out.write_all(line.as_bytes())
    }

    fn update(&mut self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        out.write_all(line.as_bytes())
    }

    fn other(&mut self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        out.write_all(line.as_bytes())
    }

    /// `---`, `+++` and `@@` control lines.
    fn header(&mut self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        out.write_all(line.as_bytes())
    }
}

/// Pass-through hooks, the default for every string-returning entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl LineStyle for Plain {}
