//! XML Entity Decoding
//!
//! Handles decoding of XML entities in character data:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present. Unknown named
//! entities are kept verbatim since DTDs are not processed.

use memchr::memchr;
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Err if a numeric character reference does not denote a valid
/// XML character.
#[inline]
pub fn decode_text(input: &str) -> Result<Cow<'_, str>, &'static str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode_entities(input).map(Cow::Owned)
}

fn decode_entities(input: &str) -> Result<String, &'static str> {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(semi) = memchr(b';', rest.as_bytes()) else {
            // No terminator, keep the ampersand as text
            break;
        };
        let entity = &rest[1..semi];
        match decode_entity(entity)? {
            Some(c) => {
                result.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    Ok(result)
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Result<Option<char>, &'static str> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric)
            .map(Some)
            .ok_or("Invalid character reference");
    }

    Ok(match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    })
}

/// Decode a numeric character reference, validating against XML 1.0 Char
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}
