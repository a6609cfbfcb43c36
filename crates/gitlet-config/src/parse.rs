//! Config file parser for git's INI-like format.

use bstr::{BString, ByteSlice};

use crate::ConfigError;

/// A single key-value occurrence, tagged with its resolved section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Lowercased section name.
    pub section: BString,
    /// Case-preserved subsection name.
    pub subsection: Option<BString>,
    /// Lowercased variable name.
    pub name: BString,
    /// Value; `None` for a bare key (which git reads as boolean true).
    pub value: Option<BString>,
}

/// Parse config bytes into a flat entry list, in file order.
pub fn parse_config(input: &[u8]) -> Result<Vec<RawEntry>, ConfigError> {
    let mut entries = Vec::new();
    let mut section: Option<(BString, Option<BString>)> = None;

    for (line_idx, line) in input.lines().enumerate() {
        let line_number = line_idx + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with(b"#") || line.starts_with(b";") {
            continue;
        }

        if line.starts_with(b"[") {
            section = Some(parse_section_header(line, line_number)?);
            continue;
        }

        let Some((ref sec, ref sub)) = section else {
            return Err(ConfigError::Parse {
                line: line_number,
                reason: "variable before any section header".into(),
            });
        };

        let (name, value) = parse_entry_line(line, line_number)?;
        entries.push(RawEntry {
            section: sec.clone(),
            subsection: sub.clone(),
            name,
            value,
        });
    }

    Ok(entries)
}

/// Parse `[section]` or `[section "subsection"]`.
fn parse_section_header(
    line: &[u8],
    line_number: usize,
) -> Result<(BString, Option<BString>), ConfigError> {
    let close = line.rfind_byte(b']').ok_or_else(|| ConfigError::Parse {
        line: line_number,
        reason: "unterminated section header".into(),
    })?;
    let inner = line[1..close].trim();

    if let Some(quote_start) = inner.find_byte(b'"') {
        let section = inner[..quote_start].trim();
        let quoted = &inner[quote_start + 1..];
        let quote_end = quoted.rfind_byte(b'"').ok_or_else(|| ConfigError::Parse {
            line: line_number,
            reason: "unterminated subsection quote".into(),
        })?;
        let subsection = unescape(&quoted[..quote_end]);
        Ok((
            BString::from(section.to_ascii_lowercase()),
            Some(subsection),
        ))
    } else {
        if inner.is_empty() || !inner.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b'.') {
            return Err(ConfigError::Parse {
                line: line_number,
                reason: format!("invalid section name: {}", inner.as_bstr()),
            });
        }
        Ok((BString::from(inner.to_ascii_lowercase()), None))
    }
}

/// Parse `name = value`, `name =`, or a bare `name`.
fn parse_entry_line(
    line: &[u8],
    line_number: usize,
) -> Result<(BString, Option<BString>), ConfigError> {
    let (name_part, value_part) = match line.find_byte(b'=') {
        Some(eq) => (line[..eq].trim(), Some(line[eq + 1..].trim())),
        None => (strip_trailing_comment(line).trim(), None),
    };

    if name_part.is_empty()
        || !name_part
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'-')
    {
        return Err(ConfigError::Parse {
            line: line_number,
            reason: format!("invalid variable name: {}", name_part.as_bstr()),
        });
    }

    let name = BString::from(name_part.to_ascii_lowercase());
    let value = value_part.map(|v| parse_value(v));
    Ok((name, value))
}

/// Parse a value: honor double quotes, backslash escapes, and strip an
/// unquoted trailing `#`/`;` comment.
fn parse_value(raw: &[u8]) -> BString {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut i = 0;

    while i < raw.len() {
        let b = raw[i];
        match b {
            b'\\' if i + 1 < raw.len() => {
                out.push(match raw[i + 1] {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'b' => 0x08,
                    other => other,
                });
                i += 2;
                continue;
            }
            b'"' => in_quotes = !in_quotes,
            b'#' | b';' if !in_quotes => break,
            _ => out.push(b),
        }
        i += 1;
    }

    BString::from(out.trim_end().to_vec())
}

fn strip_trailing_comment(line: &[u8]) -> &[u8] {
    match line.iter().position(|&b| b == b'#' || b == b';') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn unescape(raw: &[u8]) -> BString {
    let mut out = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' && i + 1 < raw.len() {
            out.push(raw[i + 1]);
            i += 2;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    BString::from(out)
}
