//! Typed value conversion (bool, int).

use bstr::{BStr, ByteSlice};

use crate::ConfigError;

/// Parse a boolean config value using git's truthiness rules:
/// a key with no `=` is true, the empty string is false, `true`/`yes`/`on`
/// and `false`/`no`/`off` are matched case-insensitively, and integers are
/// nonzero-true.
pub fn parse_bool(value: Option<&BStr>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(true),
        Some(v) => {
            let s = v.to_str_lossy();
            let s = s.trim();
            if s.is_empty() {
                return Ok(false);
            }
            match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => match s.parse::<i64>() {
                    Ok(0) => Ok(false),
                    Ok(_) => Ok(true),
                    Err(_) => Err(ConfigError::InvalidBool(s.to_string())),
                },
            }
        }
    }
}

/// Parse an integer config value with an optional k/m/g suffix
/// (powers of 1024, case-insensitive).
pub fn parse_int(value: &BStr) -> Result<i64, ConfigError> {
    let s = value.to_str_lossy();
    let s = s.trim();
    if s.is_empty() {
        return Err(ConfigError::InvalidInt("empty value".into()));
    }

    let (num_str, multiplier): (&str, i64) = match s.as_bytes().last() {
        Some(b'k') | Some(b'K') if s.len() > 1 => (&s[..s.len() - 1], 1024),
        Some(b'm') | Some(b'M') if s.len() > 1 => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g') | Some(b'G') if s.len() > 1 => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1),
    };

    let base: i64 = num_str
        .parse()
        .map_err(|_| ConfigError::InvalidInt(s.to_string()))?;

    base.checked_mul(multiplier)
        .ok_or_else(|| ConfigError::InvalidInt(format!("overflow: {s}")))
}
