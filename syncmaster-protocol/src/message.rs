//! Completed message view
//!
//! A [`Message`] borrows the framer's buffer between two framing cycles.
//! Its text ends at the framing terminator or at the first NUL byte,
//! whichever comes first, matching how the device has always compared and
//! converted received text.

/// Read-only view of one completed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message<'a> {
    bytes: &'a [u8],
}

impl<'a> Message<'a> {
    /// Wrap raw message content (terminator already stripped)
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Raw content as stored in the buffer
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Content up to the first NUL byte
    pub fn text(&self) -> &'a [u8] {
        match self.bytes.iter().position(|&b| b == 0) {
            Some(end) => &self.bytes[..end],
            None => self.bytes,
        }
    }

    /// Text as UTF-8, if valid
    pub fn as_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.text()).ok()
    }

    /// Check whether the text equals `literal` exactly
    pub fn text_eq(&self, literal: &str) -> bool {
        self.text() == literal.as_bytes()
    }

    /// Number of content bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the message has no content
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parse the text as a decimal integer
    ///
    /// Skips leading whitespace, accepts one optional sign, then consumes
    /// digits until the first non-digit. Text without a leading number
    /// yields 0. Out-of-range values saturate.
    pub fn to_int(&self) -> i32 {
        parse_int(self.text())
    }
}

/// Decimal prefix conversion with `atoi` semantics
pub fn parse_int(text: &[u8]) -> i32 {
    let mut rest = text;
    while let Some((&b, tail)) = rest.split_first() {
        if !is_space(b) {
            break;
        }
        rest = tail;
    }

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    for &b in rest {
        if !b.is_ascii_digit() {
            break;
        }
        let digit = (b - b'0') as i32;
        // Accumulate toward the sign so i32::MIN stays reachable
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// Whitespace as classified by C `isspace`
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}
