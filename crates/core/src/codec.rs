//! Lex-sortable numeric codec
//!
//! Encodes numbers into strings whose byte-wise lexicographic order matches
//! their numeric order, so array indices and numeric leaf values can live in
//! a flat ordered key space. The scheme is ELEN-style: a run of marker
//! characters (one per element of a recursive digit-length chain) followed by
//! the chain itself, shortest element first.
//!
//! Worked example with marker `'+'`:
//!
//! ```text
//! encode(1234567890) == "+++2101234567890"
//!                        ^^^ 3 chain elements: "2", "10", "1234567890"
//! ```
//!
//! Negative numbers use the `'-'` marker and have every digit
//! nine's-complemented, so more-negative values sort first and all negatives
//! sort before all non-negatives (`'-'` is 0x2D, below every digit and below
//! the default positive marker `'['`).
//!
//! Decimal fractions are supported for ordering purposes: fraction digits are
//! appended after the integer encoding and terminated with the opposite
//! marker, which sorts below digits for positives and above complemented
//! digits for negatives.

use thiserror::Error;

/// Default marker for zero and positive numbers.
///
/// Shares its code point with the number type tag on records so that a
/// record value can be ordered by its first byte.
pub const POSITIVE_MARKER: char = '[';

/// Marker for negative numbers. Sorts below digits and below `'['`.
pub const NEGATIVE_MARKER: char = '-';

/// Errors produced when decoding a lex-sortable string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The encoded string was empty
    #[error("encoded number is empty")]
    Empty,

    /// The first character was not a recognized sign marker
    #[error("expected sign marker, found {found:?}")]
    BadMarker {
        /// Character found where a marker was expected
        found: char,
    },

    /// A non-digit character appeared inside the digit chain
    #[error("expected digit, found {found:?}")]
    BadDigit {
        /// Offending character
        found: char,
    },

    /// The digit chain ended before the announced length was consumed
    #[error("encoded number is truncated")]
    Truncated,

    /// The marker count does not match the number of chain elements
    #[error("marker count {markers} does not match {elements} chain elements")]
    ChainMismatch {
        /// Number of leading marker characters
        markers: usize,
        /// Number of chain elements actually present
        elements: usize,
    },

    /// The decoded value does not fit in the target integer type
    #[error("decoded number out of range")]
    OutOfRange,

    /// The input to the encoder was not a plain decimal literal
    #[error("not a decimal literal: {0:?}")]
    NotDecimal(String),
}

/// Encode a signed integer using the default positive marker.
pub fn to_lex_sortable(value: i64) -> String {
    to_lex_sortable_with_marker(value, POSITIVE_MARKER)
}

/// Encode a signed integer with an explicit positive marker.
///
/// Negative values always use [`NEGATIVE_MARKER`] regardless of `marker`.
pub fn to_lex_sortable_with_marker(value: i64, marker: char) -> String {
    // An i64 in decimal form is always a valid literal.
    match encode_decimal_with_marker(&value.to_string(), marker) {
        Ok(encoded) => encoded,
        Err(_) => unreachable!("i64 decimal form is always encodable"),
    }
}

/// Encode a decimal number literal (`-?digits(.digits)?`) order-preservingly.
///
/// Used for numeric leaf values, where the original literal text is kept on
/// the record and this encoding is only consulted for ordering comparisons.
pub fn encode_decimal(literal: &str) -> Result<String, CodecError> {
    encode_decimal_with_marker(literal, POSITIVE_MARKER)
}

/// Encode a decimal literal with an explicit positive marker.
pub fn encode_decimal_with_marker(literal: &str, marker: char) -> Result<String, CodecError> {
    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::NotDecimal(literal.to_string()));
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::NotDecimal(literal.to_string()));
        }
    }

    let sign = if negative { NEGATIVE_MARKER } else { marker };

    // Build the recursive length chain: the digits themselves, then the
    // decimal form of their length, until a single-character element.
    let mut chain: Vec<String> = vec![int_part.to_string()];
    let mut seq = int_part.to_string();
    while seq.len() > 1 {
        seq = seq.len().to_string();
        chain.push(seq.clone());
    }

    let mut out = String::with_capacity(chain.len() + int_part.len() + 8);
    for _ in 0..chain.len() {
        out.push(sign);
    }
    for element in chain.iter().rev() {
        out.push_str(element);
    }

    if let Some(frac) = frac_part {
        out.push_str(frac);
        // Terminator sorts below digits (positives) or, once complemented,
        // above them (negatives): shorter fractions order correctly.
        out.push(if negative { marker } else { NEGATIVE_MARKER });
    }

    if negative {
        out = complement_digits(&out);
    }
    Ok(out)
}

/// Decode an integer encoded with the default positive marker.
pub fn from_lex_sortable(encoded: &str) -> Result<i64, CodecError> {
    from_lex_sortable_with_marker(encoded, POSITIVE_MARKER)
}

/// Decode an integer encoded with an explicit positive marker.
pub fn from_lex_sortable_with_marker(encoded: &str, marker: char) -> Result<i64, CodecError> {
    let first = encoded.chars().next().ok_or(CodecError::Empty)?;
    let negative = first == NEGATIVE_MARKER && marker != NEGATIVE_MARKER;
    let sign = if negative { NEGATIVE_MARKER } else { marker };
    if first != sign {
        return Err(CodecError::BadMarker { found: first });
    }

    let markers = encoded.chars().take_while(|&c| c == sign).count();
    let mut digits: String = encoded[markers * sign.len_utf8()..].to_string();
    if negative {
        digits = complement_digits(&digits);
    }

    // Walk the length chain: each element announces the length of the next.
    let mut take = 1usize;
    let mut pos = 0usize;
    let mut elements = 0usize;
    let mut last: i128 = 0;
    while pos < digits.len() {
        if pos + take > digits.len() {
            return Err(CodecError::Truncated);
        }
        let chunk = &digits[pos..pos + take];
        if let Some(bad) = chunk.chars().find(|c| !c.is_ascii_digit()) {
            return Err(CodecError::BadDigit { found: bad });
        }
        last = chunk.parse::<i128>().map_err(|_| CodecError::OutOfRange)?;
        pos += take;
        elements += 1;
        if pos < digits.len() {
            take = usize::try_from(last).map_err(|_| CodecError::OutOfRange)?;
            if take == 0 {
                return Err(CodecError::Truncated);
            }
        }
    }

    if elements == 0 {
        return Err(CodecError::Empty);
    }
    if elements != markers {
        return Err(CodecError::ChainMismatch { markers, elements });
    }

    let value = if negative { -last } else { last };
    i64::try_from(value).map_err(|_| CodecError::OutOfRange)
}

/// Nine's-complement every ASCII digit, leaving other characters alone.
fn complement_digits(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                let d = c as u8 - b'0';
                (b'9' - d) as char
            } else {
                c
            }
        })
        .collect()
}
