//! String helpers for SCP path-list lines.
//!
//! A line is either `name=path[start,end]` or plain `path[start,end]`; the
//! range field is optional. Paths use `/` as the separator.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScpError {
    #[error("invalid frame range in SCP line `{line}`")]
    InvalidRange { line: String },
}

pub type ScpResult<T> = Result<T, ScpError>;

pub const SEP: char = '/';

fn before_first(s: &str, c: char) -> &str {
    s.split_once(c).map_or(s, |(head, _)| head)
}

fn after_last(s: &str, c: char) -> &str {
    s.rsplit_once(c).map_or(s, |(_, tail)| tail)
}

/// Identifier used to key a line: before `=`, before `[`, after the last `/`.
pub fn utterance_id(line: &str) -> &str {
    base_name(before_first(before_first(line, '='), '['))
}

/// Logical name of a line: before `=`, after the last `/`. Any range field on
/// a plain path line is kept.
pub fn logical_name(line: &str) -> &str {
    base_name(before_first(line, '='))
}

/// Everything before the first `[`.
pub fn strip_range(line: &str) -> &str {
    before_first(line, '[')
}

/// Text after the last `[`, i.e. `start,end]`, if the line has one.
pub fn range_field(line: &str) -> Option<&str> {
    line.rsplit_once('[').map(|(_, tail)| tail)
}

/// Physical side of a line: everything after the last `=`.
pub fn physical_path(line: &str) -> &str {
    after_last(line, '=')
}

pub fn base_name(path: &str) -> &str {
    after_last(path, SEP)
}

/// POSIX `dirname`: the head up to the last `/`, without trailing slashes
/// unless the head is nothing but slashes.
pub fn dir_name(path: &str) -> &str {
    match path.rfind(SEP) {
        None => "",
        Some(idx) => {
            let head = &path[..=idx];
            if head.chars().all(|c| c == SEP) {
                head
            } else {
                head.trim_end_matches(SEP)
            }
        }
    }
}

/// Empty stays empty; anything else gets a trailing `/`.
pub fn ensure_trailing_sep(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with(SEP) {
        dir.to_owned()
    } else {
        format!("{dir}{SEP}")
    }
}

/// POSIX `splitext`: `(root, ext)` with `ext` starting at the last dot of
/// the base name. Leading dots of the base name never start an extension.
pub fn split_ext(path: &str) -> (&str, &str) {
    let name_start = path.rfind(SEP).map_or(0, |i| i + 1);
    match path.rfind('.') {
        Some(dot) if dot >= name_start && path[name_start..dot].bytes().any(|b| b != b'.') => {
            (&path[..dot], &path[dot..])
        }
        _ => (path, ""),
    }
}

/// `[start,end]` frame range of an extended SCP line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

impl FrameRange {
    /// Parse the range after the last `[`. `Ok(None)` when there is no
    /// closing `]`.
    pub fn parse(line: &str) -> ScpResult<Option<Self>> {
        let item = after_last(line, '[');
        let Some((inner, _)) = item.split_once(']') else {
            return Ok(None);
        };
        let invalid = || ScpError::InvalidRange {
            line: line.to_owned(),
        };
        let mut parts = inner.split(',');
        let mut next = || -> ScpResult<i64> {
            parts
                .next()
                .and_then(|p| p.trim().parse().ok())
                .ok_or_else(invalid)
        };
        let start = next()?;
        let end = next()?;
        Ok(Some(FrameRange { start, end }))
    }

    /// Shift the range to start at frame zero.
    pub fn rebased(self) -> Self {
        FrameRange {
            start: 0,
            end: self.end - self.start,
        }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:06},{:06}]", self.start, self.end)
    }
}

/// Rebased range field of `line` (`[000000,length]`), or `""` without one.
pub fn rebase_range_field(line: &str) -> ScpResult<String> {
    Ok(FrameRange::parse(line)?
        .map(|range| range.rebased().to_string())
        .unwrap_or_default())
}

/// Swap the extension of every path on `line` (space separated) for `ext`.
///
/// With `extended`, a leading `name=` gets the same treatment and range
/// fields are kept; otherwise both are dropped.
pub fn replace_data_ext(line: &str, ext: &str, extended: bool) -> String {
    let (name, body) = match line.split_once('=') {
        Some((name, rest)) => (
            format!("{}.{ext}=", split_ext(name).0),
            before_first(rest, '='),
        ),
        None => (String::new(), line),
    };

    let paths: Vec<String> = body
        .split(' ')
        .map(|item| {
            let (path, range) = match item.split_once('[') {
                Some((path, range)) => (path, Some(before_first(range, '['))),
                None => (item, None),
            };
            let mut out = format!("{}.{ext}", split_ext(path).0);
            if let (true, Some(range)) = (extended, range) {
                out.push('[');
                out.push_str(range);
            }
            out
        })
        .collect();

    if extended {
        name + &paths.join(" ")
    } else {
        paths.join(" ")
    }
}
