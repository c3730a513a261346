//! Markup translator for publicity messages.
//!
//! Users write `(b)bold(/b)`, `(i)italic(/i)`, `(u)underline(/u)`,
//! `(s)strike(/s)` and `[label](https://url)`. [`translate`] rewrites those
//! into the HTML subset Telegram understands and then checks that the result
//! is a well-formed markup fragment, so a message with crossing or dangling
//! tags is never forwarded.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

/// A single `(x)...(/x)` substitution pass
struct StylePass {
    pattern: Regex,
    replacement: String,
}

impl StylePass {
    fn new(tag: &str) -> Self {
        Self {
            pattern: Regex::new(&format!(r"\({0}\)(.*?)\(/{0}\)", tag))
                .expect("Invalid style tag regex pattern"),
            replacement: format!("<{0}>${{1}}</{0}>", tag),
        }
    }
}

lazy_static! {
    // Order matters: hyperlinks are substituted after every style pass.
    static ref STYLE_PASSES: Vec<StylePass> = ["b", "i", "u", "s"]
        .iter()
        .map(|tag| StylePass::new(tag))
        .collect();
    static ref HYPERLINK_REGEX: Regex = Regex::new(r"\[(.*?)\]\((https?://[^\s]+)\)")
        .expect("Invalid hyperlink regex pattern");
}

/// Entities accepted inside text and attribute values
const NAMED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Why a message could not be turned into valid markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    message: String,
    offset: usize,
}

impl FormatError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }

    /// Human-readable description of the problem
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset into the translated HTML where the problem was found
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unbalanced or invalid tags in formatting: {} (at byte {})",
            self.message, self.offset
        )
    }
}

impl std::error::Error for FormatError {}

/// Convert user markup into an HTML fragment.
///
/// Style tags are matched non-greedily against the first closing tag and do
/// not track nesting depth; an opening tag without a closing tag is left as
/// literal text. The substituted text must then pass [`validate_fragment`].
pub fn translate(input: &str) -> Result<String, FormatError> {
    let mut formatted = input.to_string();
    for pass in STYLE_PASSES.iter() {
        formatted = pass
            .pattern
            .replace_all(&formatted, pass.replacement.as_str())
            .into_owned();
    }
    formatted = HYPERLINK_REGEX
        .replace_all(&formatted, r#"<a href="${2}">${1}</a>"#)
        .into_owned();

    validate_fragment(&formatted)?;
    Ok(formatted)
}

/// Check that `fragment` is well-formed element content.
///
/// Tags must be properly nested (crossing tags are rejected, not only
/// unbalanced counts), attributes must be quoted and unique, a literal `<`
/// is not allowed and `&` must start a known or numeric entity.
pub fn validate_fragment(fragment: &str) -> Result<(), FormatError> {
    let bytes = fragment.as_bytes();
    let mut open: Vec<(&str, usize)> = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'<' => pos = scan_markup(fragment, pos, &mut open)?,
            b'&' => pos = scan_entity(fragment, pos)?,
            _ => pos += 1,
        }
    }

    match open.pop() {
        Some((name, offset)) => Err(FormatError::new(
            format!("<{}> is never closed", name),
            offset,
        )),
        None => Ok(()),
    }
}

fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b':' || byte >= 0x80
}

fn is_name_char(byte: u8) -> bool {
    is_name_start(byte) || byte.is_ascii_digit() || byte == b'-' || byte == b'.'
}

/// Returns the end offset of the name starting at `start`, if any
fn scan_name(fragment: &str, start: usize) -> Option<usize> {
    let bytes = fragment.as_bytes();
    if start >= bytes.len() || !is_name_start(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_name_char(bytes[end]) {
        end += 1;
    }
    Some(end)
}

fn skip_whitespace(fragment: &str, mut pos: usize) -> usize {
    let bytes = fragment.as_bytes();
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn scan_markup<'a>(
    fragment: &'a str,
    start: usize,
    open: &mut Vec<(&'a str, usize)>,
) -> Result<usize, FormatError> {
    let rest = &fragment[start..];

    if rest.starts_with("<!--") {
        let body_start = start + 4;
        let close = fragment[body_start..]
            .find("--")
            .map(|i| body_start + i)
            .ok_or_else(|| FormatError::new("comment is never terminated", start))?;
        if !fragment[close..].starts_with("-->") {
            return Err(FormatError::new("'--' is not allowed inside a comment", close));
        }
        return Ok(close + 3);
    }

    if rest.starts_with("</") {
        let name_end = scan_name(fragment, start + 2)
            .ok_or_else(|| FormatError::new("closing tag has no name", start))?;
        let name = &fragment[start + 2..name_end];
        let end = skip_whitespace(fragment, name_end);
        if fragment.as_bytes().get(end) != Some(&b'>') {
            return Err(FormatError::new(
                format!("closing tag </{}> is not terminated", name),
                start,
            ));
        }
        return match open.pop() {
            Some((top, _)) if top == name => Ok(end + 1),
            Some((top, _)) => Err(FormatError::new(
                format!("</{}> does not match the open <{}> tag", name, top),
                start,
            )),
            None => Err(FormatError::new(
                format!("</{}> has no matching opening tag", name),
                start,
            )),
        };
    }

    let name_end = scan_name(fragment, start + 1).ok_or_else(|| {
        FormatError::new("'<' must start a tag; write &lt; for a literal '<'", start)
    })?;
    let name = &fragment[start + 1..name_end];
    let bytes = fragment.as_bytes();
    let mut attributes: Vec<&str> = Vec::new();
    let mut pos = name_end;

    loop {
        let after_space = skip_whitespace(fragment, pos);
        let had_space = after_space > pos;
        pos = after_space;

        match bytes.get(pos) {
            None => {
                return Err(FormatError::new(
                    format!("tag <{}> is not terminated", name),
                    start,
                ))
            }
            Some(b'>') => {
                open.push((name, start));
                return Ok(pos + 1);
            }
            Some(b'/') => {
                if bytes.get(pos + 1) == Some(&b'>') {
                    return Ok(pos + 2);
                }
                return Err(FormatError::new(
                    format!("unexpected '/' in tag <{}>", name),
                    pos,
                ));
            }
            Some(_) if !had_space => {
                return Err(FormatError::new(
                    format!("expected whitespace before attribute in <{}>", name),
                    pos,
                ))
            }
            Some(_) => {
                let attr_end = scan_name(fragment, pos).ok_or_else(|| {
                    FormatError::new(format!("invalid attribute in <{}>", name), pos)
                })?;
                let attr = &fragment[pos..attr_end];
                if attributes.contains(&attr) {
                    return Err(FormatError::new(
                        format!("duplicate attribute '{}' in <{}>", attr, name),
                        pos,
                    ));
                }
                attributes.push(attr);

                pos = skip_whitespace(fragment, attr_end);
                if bytes.get(pos) != Some(&b'=') {
                    return Err(FormatError::new(
                        format!("attribute '{}' has no value", attr),
                        pos,
                    ));
                }
                pos = skip_whitespace(fragment, pos + 1);
                pos = scan_attribute_value(fragment, pos, attr)?;
            }
        }
    }
}

/// Scan a quoted attribute value starting at its opening quote
fn scan_attribute_value(fragment: &str, start: usize, attr: &str) -> Result<usize, FormatError> {
    let bytes = fragment.as_bytes();
    let quote = match bytes.get(start) {
        Some(&q) if q == b'"' || q == b'\'' => q,
        _ => {
            return Err(FormatError::new(
                format!("value of attribute '{}' must be quoted", attr),
                start,
            ))
        }
    };

    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b if b == quote => return Ok(pos + 1),
            b'<' => {
                return Err(FormatError::new(
                    format!("'<' is not allowed in attribute '{}'", attr),
                    pos,
                ))
            }
            b'&' => pos = scan_entity(fragment, pos)?,
            _ => pos += 1,
        }
    }

    Err(FormatError::new(
        format!("value of attribute '{}' is never closed", attr),
        start,
    ))
}

/// Scan an entity reference starting at `&`
fn scan_entity(fragment: &str, start: usize) -> Result<usize, FormatError> {
    let bytes = fragment.as_bytes();
    let mut end = start + 1;
    while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'#') {
        end += 1;
    }

    let invalid = || FormatError::new("'&' must start an entity such as &amp;", start);
    if bytes.get(end) != Some(&b';') {
        return Err(invalid());
    }

    let body = &fragment[start + 1..end];
    let valid = if let Some(hex) = body.strip_prefix("#x") {
        numeric_reference_is_valid(hex, 16)
    } else if let Some(decimal) = body.strip_prefix('#') {
        numeric_reference_is_valid(decimal, 10)
    } else {
        NAMED_ENTITIES.contains(&body)
    };

    if valid {
        Ok(end + 1)
    } else {
        Err(invalid())
    }
}

fn numeric_reference_is_valid(digits: &str, radix: u32) -> bool {
    !digits.is_empty()
        && u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32)
            .is_some_and(|c| c != '\0')
}
