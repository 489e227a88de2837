use super::{ExtractError, convert};
use crate::Result;
use crate::model::{Artifact, Value, ValueType};
use ohno::bail;

/// Extracts a value from a file of shell-style `KEY=VALUE` assignments, such as `/etc/os-release`.
///
/// Double-quoted values are unquoted, honoring backslash escapes. Single-quoted
/// values are returned as written, quotes included.
#[derive(Debug)]
pub struct KeyValueExtractor {
    key: String,
}

impl KeyValueExtractor {
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            bail!("variable name cannot be empty");
        }

        Ok(Self { key: key.to_string() })
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(super) fn extract(&self, artifact: &Artifact, value_type: ValueType) -> Result<Value, ExtractError> {
        let content = artifact.content()?;
        let text = core::str::from_utf8(content)
            .map_err(|e| ExtractError::parse_failure(format!("artifact '{}' is not valid UTF-8: {e}", artifact.name())))?;

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, raw)) = line.split_once('=') else {
                continue;
            };

            if key.trim() != self.key {
                continue;
            }

            let raw = raw.trim();
            let value = unquote(raw).unwrap_or_else(|| raw.to_string());
            return convert(&value, value_type).map_err(|e| match e {
                ExtractError::ParseFailure(m) => ExtractError::parse_failure(format!(
                    "converting variable '{}' on line {}: {m}",
                    self.key,
                    index + 1
                )),
                fatal @ ExtractError::Fatal(_) => fatal,
            });
        }

        Err(ExtractError::parse_failure(format!(
            "variable '{}' not found in artifact '{}'",
            self.key,
            artifact.name()
        )))
    }
}

/// Strip double quotes or backquotes, resolving escapes inside double quotes.
///
/// Recognized escapes are the single-character ones (`\n`, `\t`, `\"`, ...), `\NNN`
/// (three octal digits), `\xNN`, `\uNNNN` and `\UNNNNNNNN`. Octal and `\x` escapes
/// denote bytes, and the result must be valid UTF-8.
///
/// Returns `None` when the text is not a well-formed quoted string.
fn unquote(raw: &str) -> Option<String> {
    if let Some(inner) = raw.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return (!inner.contains('`')).then(|| inner.to_string());
    }

    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => return None,
            '\\' => match chars.next()? {
                'x' => out.push(u8::try_from(digits(&mut chars, 16, 2)?).ok()?),
                d @ '0'..='7' => {
                    let code = d.to_digit(8)? * 64 + digits(&mut chars, 8, 2)?;
                    out.push(u8::try_from(code).ok()?);
                }
                'u' => push_char(&mut out, char::from_u32(digits(&mut chars, 16, 4)?)?),
                'U' => push_char(&mut out, char::from_u32(digits(&mut chars, 16, 8)?)?),
                escaped => push_char(&mut out, simple_escape(escaped)?),
            },
            _ => push_char(&mut out, c),
        }
    }

    String::from_utf8(out).ok()
}

const fn simple_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0c}'),
        'v' => Some('\u{0b}'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    }
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Read exactly `count` digits in `radix`.
fn digits(chars: &mut core::str::Chars<'_>, radix: u32, count: usize) -> Option<u32> {
    let mut code = 0_u32;
    for _ in 0..count {
        code = code * radix + chars.next()?.to_digit(radix)?;
    }
    Some(code)
}
