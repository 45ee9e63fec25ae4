//! Applying unified-diff patches to in-memory text.
//!
//! Hunk line numbers refer to the original text, and hunks may appear in any
//! order (the update feed does not sort them). Every hunk is therefore
//! located against the original lines, never against a partially patched
//! result.

use regex::Regex;
use thiserror::Error;

const HUNK_HEADER: &str = r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("invalid hunk header pattern: {0}")]
    InvalidPattern(String),

    #[error("malformed hunk header '{0}'")]
    MalformedHeader(String),

    #[error("unexpected patch line '{0}'")]
    UnexpectedLine(String),

    #[error("patch contains no hunks")]
    NoHunks,

    #[error("hunk at line {start} exceeds file length {len}")]
    OutOfRange { start: usize, len: usize },

    #[error("line {line}: expected '{expected}', found '{found}'")]
    Mismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("hunks overlap at line {line}")]
    Overlap { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Hunk {
    old_start: usize,
    old_count: usize,
    old_lines: Vec<String>,
    new_lines: Vec<String>,
    /// Set by a `\` marker after a `+` or context line
    new_missing_newline: bool,
}

impl Hunk {
    /// Zero-based index of the first original line the hunk replaces.
    fn start_index(&self) -> usize {
        if self.old_count == 0 {
            // `-N,0` inserts after line N
            self.old_start
        } else {
            self.old_start.saturating_sub(1)
        }
    }
}

fn parse_hunks(patch: &str) -> Result<Vec<Hunk>, PatchError> {
    let header = Regex::new(HUNK_HEADER).map_err(|e| PatchError::InvalidPattern(e.to_string()))?;
    let mut hunks: Vec<Hunk> = Vec::new();
    let mut in_hunk = false;
    let mut previous = ' ';
    let mut lines = patch.lines().peekable();

    while let Some(line) = lines.next() {
        if line.starts_with("@@") {
            let caps = header
                .captures(line)
                .ok_or_else(|| PatchError::MalformedHeader(line.to_string()))?;
            let number = |idx: usize| -> Result<usize, PatchError> {
                caps.get(idx)
                    .map(|m| m.as_str().parse::<usize>())
                    .unwrap_or(Ok(1))
                    .map_err(|_| PatchError::MalformedHeader(line.to_string()))
            };
            hunks.push(Hunk {
                old_start: number(1)?,
                old_count: number(2)?,
                old_lines: Vec::new(),
                new_lines: Vec::new(),
                new_missing_newline: false,
            });
            in_hunk = true;
            continue;
        }

        // "--- a" directly followed by "+++ b" starts the next file section
        if line.starts_with("--- ") && lines.peek().is_some_and(|next| next.starts_with("+++ ")) {
            lines.next();
            in_hunk = false;
            continue;
        }

        let Some(hunk) = hunks.last_mut().filter(|_| in_hunk) else {
            // file headers ("diff ...", "index ...") outside a hunk
            continue;
        };

        if let Some(rest) = line.strip_prefix('-') {
            hunk.old_lines.push(rest.to_string());
            previous = '-';
        } else if let Some(rest) = line.strip_prefix('+') {
            hunk.new_lines.push(rest.to_string());
            hunk.new_missing_newline = false;
            previous = '+';
        } else if let Some(rest) = line.strip_prefix(' ') {
            hunk.old_lines.push(rest.to_string());
            hunk.new_lines.push(rest.to_string());
            hunk.new_missing_newline = false;
            previous = ' ';
        } else if line.is_empty() {
            hunk.old_lines.push(String::new());
            hunk.new_lines.push(String::new());
            previous = ' ';
        } else if line.starts_with('\\') {
            // "\ No newline at end of file" applies to the line before it
            if previous != '-' {
                hunk.new_missing_newline = true;
            }
        } else {
            return Err(PatchError::UnexpectedLine(line.to_string()));
        }
    }

    if hunks.is_empty() {
        return Err(PatchError::NoHunks);
    }
    Ok(hunks)
}

/// Apply `patch` to `original`, returning the patched text.
pub fn apply_patch(original: &str, patch: &str) -> Result<String, PatchError> {
    let mut hunks = parse_hunks(patch)?;
    hunks.sort_by_key(Hunk::start_index);

    let mut trailing_newline = original.ends_with('\n');
    let lines: Vec<&str> = if original.is_empty() {
        Vec::new()
    } else {
        original
            .strip_suffix('\n')
            .unwrap_or(original)
            .split('\n')
            .collect()
    };

    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut cursor = 0;

    for hunk in &hunks {
        let start = hunk.start_index();
        if start < cursor {
            return Err(PatchError::Overlap {
                line: hunk.old_start,
            });
        }
        let end = start
            .checked_add(hunk.old_lines.len())
            .filter(|end| *end <= lines.len());
        let Some(end) = end else {
            return Err(PatchError::OutOfRange {
                start: hunk.old_start,
                len: lines.len(),
            });
        };

        for (offset, expected) in hunk.old_lines.iter().enumerate() {
            let found = lines[start + offset].strip_suffix('\r').unwrap_or(lines[start + offset]);
            if found != expected.strip_suffix('\r').unwrap_or(expected.as_str()) {
                return Err(PatchError::Mismatch {
                    line: start + offset + 1,
                    expected: expected.clone(),
                    found: found.to_string(),
                });
            }
        }

        output.extend(lines[cursor..start].iter().map(|l| l.to_string()));
        output.extend(hunk.new_lines.iter().cloned());
        cursor = end;

        if end == lines.len() {
            // the last emitted line now comes from this hunk (or precedes it)
            trailing_newline = hunk.new_lines.is_empty() || !hunk.new_missing_newline;
        }
    }
    output.extend(lines[cursor..].iter().map(|l| l.to_string()));

    let mut patched = output.join("\n");
    if trailing_newline && !patched.is_empty() {
        patched.push('\n');
    }
    Ok(patched)
}
