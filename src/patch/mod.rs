mod types;
pub use types::*;

use crate::PatchError;

// "4,2" or a bare "4"; an empty range prints the line just before the
// range, so its 0-based start is the printed number itself.
fn parse_range(s: &str) -> Result<usize, PatchError> {
    let bad = || PatchError::InvalidFormat(s.to_string());
    let (beginning, length) = match s.split_once(',') {
        Some((b, l)) => (
            b.parse::<usize>().map_err(|_| bad())?,
            l.parse::<usize>().map_err(|_| bad())?,
        ),
        None => (s.parse::<usize>().map_err(|_| bad())?, 1),
    };
    if length == 0 {
        Ok(beginning)
    } else if beginning == 0 {
        Err(bad())
    } else {
        Ok(beginning - 1)
    }
}

fn parse_hunk_header(s: &str) -> Result<(usize, usize), PatchError> {
    // s = "@@ -1,4 +1,4 @@"
    let bad = || PatchError::InvalidFormat(s.to_string());
    let inner = s
        .strip_prefix("@@ ")
        .and_then(|rest| rest.strip_suffix(" @@"))
        .ok_or_else(bad)?;
    let (old, new) = inner.split_once(' ').ok_or_else(bad)?;
    let old_start = parse_range(old.strip_prefix('-').ok_or_else(bad)?)?;
    let new_start = parse_range(new.strip_prefix('+').ok_or_else(bad)?)?;
    Ok((old_start, new_start))
}

/// Parse a rendered unified diff back into hunks.
///
/// Accepts exactly what the renderer produces: optional `---`/`+++`
/// headers before the first hunk, `@@` headers, and prefixed body lines
/// carrying their own terminators. The empty string parses to no hunks.
pub fn parse(s: &str) -> Result<Vec<Hunk>, PatchError> {
    let mut hunks: Vec<Hunk> = vec![];
    let mut current: Option<Hunk> = None;

    for line in s.split_inclusive('\n') {
        if line.starts_with("@@") {
            if let Some(h) = current.take() {
                hunks.push(h);
            }
            let (old_start, new_start) = parse_hunk_header(line.trim_end())?;
            current = Some(Hunk {
                old_start,
                new_start,
                lines: vec![],
            });
        } else if let Some(h) = current.as_mut() {
            // body first: a deleted line may itself start with "--"
            let parsed = match line.chars().next() {
                Some(' ') => PatchLine::Equal(line[1..].to_string()),
                Some('-') => PatchLine::Delete(line[1..].to_string()),
                Some('+') => PatchLine::Insert(line[1..].to_string()),
                _ => return Err(PatchError::UnexpectedToken(line.to_string())),
            };
            h.lines.push(parsed);
        } else if line.starts_with("--- ") || line.starts_with("+++ ") {
            continue;
        } else {
            return Err(PatchError::InvalidFormat(line.to_string()));
        }
    }

    if let Some(h) = current.take() {
        hunks.push(h);
    }
    Ok(hunks)
}

/// Apply parsed hunks to the old sequence, verifying context along the
/// way, and return the new sequence.
pub fn apply(old: &[String], hunks: &[Hunk]) -> Result<Vec<String>, PatchError> {
    let mut new = Vec::new();
    let mut pos = 0;

    for hunk in hunks {
        if hunk.old_start < pos || hunk.old_start > old.len() {
            return Err(PatchError::InvalidFormat(format!(
                "hunk at old line {} is out of order or out of bounds",
                hunk.old_start
            )));
        }
        new.extend(old[pos..hunk.old_start].iter().cloned());
        pos = hunk.old_start;

        for line in &hunk.lines {
            match line {
                PatchLine::Insert(text) => new.push(text.clone()),
                PatchLine::Equal(text) | PatchLine::Delete(text) => {
                    let found = old.get(pos).ok_or_else(|| PatchError::ContextMismatch {
                        line: pos,
                        expected: text.clone(),
                        found: "<end of input>".to_string(),
                    })?;
                    if found != text {
                        return Err(PatchError::ContextMismatch {
                            line: pos,
                            expected: text.clone(),
                            found: found.clone(),
                        });
                    }
                    if matches!(line, PatchLine::Equal(_)) {
                        new.push(found.clone());
                    }
                    pos += 1;
                }
            }
        }
    }

    new.extend(old[pos..].iter().cloned());
    Ok(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unified::{self, Unified};

    fn lines(els: &[&str]) -> Vec<String> {
        els.iter().map(|s| format!("{}\n", s)).collect()
    }

    #[test]
    fn test_parse_hunk_header() {
        assert_eq!(parse_hunk_header("@@ -1,3 +1,4 @@").unwrap(), (0, 0));
        assert_eq!(parse_hunk_header("@@ -0,0 +1,2 @@").unwrap(), (0, 0));
        assert_eq!(parse_hunk_header("@@ -2,2 +3,0 @@").unwrap(), (1, 3));
        assert_eq!(parse_hunk_header("@@ -4 +4 @@").unwrap(), (3, 3));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_hunk_header("@@ -x,3 +1,4 @@").is_err());
        assert!(parse("wat\n").is_err());
        assert!(parse("@@ -1,1 +1,1 @@\n?a\n").is_err());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_skips_file_headers() {
        let patch = "--- old.txt\n+++ new.txt\n@@ -1 +1 @@\n-a\n+b\n";
        let hunks = parse(patch).unwrap();
        assert_eq!(
            hunks,
            vec![Hunk {
                old_start: 0,
                new_start: 0,
                lines: vec![
                    PatchLine::Delete("a\n".to_string()),
                    PatchLine::Insert("b\n".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn test_parse_deleted_line_resembling_header() {
        let patch = "@@ -1,2 +1,1 @@\n---- not a header\n x\n";
        let hunks = parse(patch).unwrap();
        assert_eq!(
            hunks[0].lines[0],
            PatchLine::Delete("--- not a header\n".to_string())
        );
    }

    #[test]
    fn test_apply_change_in_middle() {
        let old = lines(&["a", "b", "c", "d", "e"]);
        let new = lines(&["a", "b", "X", "d", "e"]);
        let patch = unified::diff_string(&old, &new, &Unified::default()).unwrap();
        let hunks = parse(&patch).unwrap();
        assert_eq!(apply(&old, &hunks).unwrap(), new);
    }

    #[test]
    fn test_apply_multiple_hunks() {
        let old = lines(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
        let new = lines(&["X", "b", "c", "d", "e", "f", "g", "h", "i", "Y"]);
        let patch = unified::diff_string(&old, &new, &Unified::default()).unwrap();
        let hunks = parse(&patch).unwrap();
        assert_eq!(hunks.len(), 2);
        assert_eq!(apply(&old, &hunks).unwrap(), new);
    }

    #[test]
    fn test_apply_insert_into_empty() {
        let old: Vec<String> = vec![];
        let new = lines(&["a", "b"]);
        let patch = unified::diff_string(&old, &new, &Unified::default()).unwrap();
        let hunks = parse(&patch).unwrap();
        assert_eq!(apply(&old, &hunks).unwrap(), new);
    }

    #[test]
    fn test_apply_delete_everything() {
        let old = lines(&["a", "b"]);
        let patch = unified::diff_string(&old, &[], &Unified::default()).unwrap();
        let hunks = parse(&patch).unwrap();
        assert_eq!(apply(&old, &hunks).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_apply_context_mismatch() {
        let old = lines(&["a", "b", "c"]);
        let bad = Hunk {
            old_start: 0,
            new_start: 0,
            lines: vec![
                PatchLine::Equal("x\n".to_string()),
                PatchLine::Delete("y\n".to_string()),
                PatchLine::Insert("z\n".to_string()),
            ],
        };
        assert!(matches!(
            apply(&old, &[bad]),
            Err(PatchError::ContextMismatch { line: 0, .. })
        ));
    }

    #[test]
    fn test_apply_out_of_order_hunks() {
        let old = lines(&["a", "b", "c"]);
        let h1 = Hunk {
            old_start: 2,
            new_start: 2,
            lines: vec![PatchLine::Delete("c\n".to_string())],
        };
        let h0 = Hunk {
            old_start: 0,
            new_start: 0,
            lines: vec![PatchLine::Delete("a\n".to_string())],
        };
        assert!(apply(&old, &[h1, h0]).is_err());
    }

    #[test]
    fn test_apply_past_end_of_input() {
        let old = lines(&["a"]);
        let h = Hunk {
            old_start: 0,
            new_start: 0,
            lines: vec![
                PatchLine::Delete("a\n".to_string()),
                PatchLine::Delete("b\n".to_string()),
            ],
        };
        assert!(matches!(
            apply(&old, &[h]),
            Err(PatchError::ContextMismatch { line: 1, .. })
        ));
    }
}
