mod types;
pub use types::*;

use std::hash::Hash;
use std::io::Write;

use log::trace;

use crate::lines::split_lines;
use crate::matcher::{SequenceMatcher, Tag};
use crate::PatchError;

/// Format one side of a `@@` header per the unified format: 1-based
/// beginning, length omitted when it is exactly 1, and an empty range
/// printed as `beginning,0` with the beginning moved to the line just
/// before the insertion point.
pub fn format_range_unified(start: usize, stop: usize) -> String {
    let mut beginning = start + 1;
    let length = stop - start;
    if length == 1 {
        return beginning.to_string();
    }
    if length == 0 {
        beginning -= 1;
    }
    format!("{},{}", beginning, length)
}

/// Render the diff between `a` and `b` into `out` in unified format.
///
/// Body lines are written with their category prefix through the matching
/// [`LineStyle`] hook and carry their own terminators; control lines use
/// `opts.eol`. The first failing write aborts rendering and is returned
/// as-is. Identical inputs write nothing, headers included.
pub fn write_diff<T>(
    out: &mut dyn Write,
    a: &[T],
    b: &[T],
    opts: &Unified,
    style: &mut dyn LineStyle,
) -> Result<(), PatchError>
where
    T: Eq + Hash + AsRef<str>,
{
    let eol = if opts.eol.is_empty() {
        "\n"
    } else {
        opts.eol.as_str()
    };

    let mut matcher = SequenceMatcher::new(a, b);
    let groups = matcher.get_grouped_opcodes(opts.context);
    trace!("rendering {} hunks", groups.len());

    let mut started = false;
    for group in &groups {
        if !started {
            started = true;
            if !opts.from_file.is_empty() || !opts.to_file.is_empty() {
                let from_date = if opts.from_date.is_empty() {
                    String::new()
                } else {
                    format!("\t{}", opts.from_date)
                };
                let to_date = if opts.to_date.is_empty() {
                    String::new()
                } else {
                    format!("\t{}", opts.to_date)
                };
                style.header(out, &format!("--- {}{}{}", opts.from_file, from_date, eol))?;
                style.header(out, &format!("+++ {}{}{}", opts.to_file, to_date, eol))?;
            }
        }

        let first = &group[0];
        let last = &group[group.len() - 1];
        let range_a = format_range_unified(first.i1, last.i2);
        let range_b = format_range_unified(first.j1, last.j2);
        style.header(out, &format!("@@ -{} +{} @@{}", range_a, range_b, eol))?;

        for c in group {
            match c.tag {
                Tag::Equal => {
                    for line in &a[c.i1..c.i2] {
                        style.equal(out, &format!(" {}", line.as_ref()))?;
                    }
                }
                Tag::Delete => {
                    for line in &a[c.i1..c.i2] {
                        style.delete(out, &format!("-{}", line.as_ref()))?;
                    }
                }
                Tag::Insert => {
                    for line in &b[c.j1..c.j2] {
                        style.insert(out, &format!("+{}", line.as_ref()))?;
                    }
                }
                Tag::Replace => {
                    for line in &a[c.i1..c.i2] {
                        style.delete(out, &format!("-{}", line.as_ref()))?;
                    }
                    for line in &b[c.j1..c.j2] {
                        style.update(out, &format!("+{}", line.as_ref()))?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Like [`write_diff`] but into a fresh `String`, with custom hooks.
pub fn diff_string_with<T>(
    a: &[T],
    b: &[T],
    opts: &Unified,
    style: &mut dyn LineStyle,
) -> Result<String, PatchError>
where
    T: Eq + Hash + AsRef<str>,
{
    let mut buf: Vec<u8> = Vec::new();
    write_diff(&mut buf, a, b, opts, style)?;
    Ok(String::from_utf8(buf)?)
}

/// Like [`write_diff`] but into a fresh `String`, with pass-through hooks.
pub fn diff_string<T>(a: &[T], b: &[T], opts: &Unified) -> Result<String, PatchError>
where
    T: Eq + Hash + AsRef<str>,
{
    diff_string_with(a, b, opts, &mut Plain)
}

/// Split two texts into lines and render their unified diff.
///
/// ```
/// use seamline::unified::{self, Unified};
///
/// let patch = unified::diff_text("one\ntwo\nthree\n", "one\n2\nthree\n", &Unified::default())
///     .unwrap();
/// assert_eq!(patch, "@@ -1,3 +1,3 @@\n one\n-two\n+2\n three\n");
/// ```
pub fn diff_text(old: &str, new: &str, opts: &Unified) -> Result<String, PatchError> {
    let a = split_lines(old);
    let b = split_lines(new);
    diff_string(&a, &b, opts)
}
