//! XML character classes
//!
//! Pure predicates over code points, backed by immutable static tables:
//! - ASCII: a 128-entry class table built at compile time
//! - Everything else: sorted range tables searched with `binary_search_by`
//!
//! Nothing here holds state, so the tables are shared freely between
//! parses running on different threads.

use std::cmp::Ordering;

const NAME_START: u8 = 1;
const NAME: u8 = 2;
const WHITESPACE: u8 = 4;
const PUBID: u8 = 8;

static ASCII_CLASSES: [u8; 128] = build_ascii_classes();

const fn build_ascii_classes() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        let b = i as u8;
        let mut class = 0;
        if b.is_ascii_alphabetic() || b == b'_' || b == b':' {
            class |= NAME_START | NAME;
        }
        if b.is_ascii_digit() || b == b'-' || b == b'.' {
            class |= NAME;
        }
        if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
            class |= WHITESPACE;
        }
        if b.is_ascii_alphanumeric() || b == b' ' || b == b'\r' || b == b'\n' {
            class |= PUBID;
        }
        table[i] = class;
        i += 1;
    }
    // PubidChar punctuation: -'()+,./:=?;!*#@$_%
    let punct = b"-'()+,./:=?;!*#@$_%";
    let mut j = 0;
    while j < punct.len() {
        table[punct[j] as usize] |= PUBID;
        j += 1;
    }
    table
}

/// Non-ASCII NameStartChar ranges (XML 1.0 fifth edition, XML 1.1)
static NAME_START_RANGES: &[(u32, u32)] = &[
    (0xC0, 0xD6),
    (0xD8, 0xF6),
    (0xF8, 0x2FF),
    (0x370, 0x37D),
    (0x37F, 0x1FFF),
    (0x200C, 0x200D),
    (0x2070, 0x218F),
    (0x2C00, 0x2FEF),
    (0x3001, 0xD7FF),
    (0xF900, 0xFDCF),
    (0xFDF0, 0xFFFD),
    (0x10000, 0xEFFFF),
];

/// Non-ASCII characters allowed after the first character of a Name
static NAME_EXTRA_RANGES: &[(u32, u32)] = &[(0xB7, 0xB7), (0x300, 0x36F), (0x203F, 0x2040)];

/// XML 1.0 Char, excluding the ASCII range handled by the class table
static CHAR_RANGES: &[(u32, u32)] = &[(0x80, 0xD7FF), (0xE000, 0xFFFD), (0x10000, 0x10FFFF)];

/// Code points XML 1.1 accepts only through character references
static RESTRICTED_11_RANGES: &[(u32, u32)] = &[(0x1, 0x8), (0xB, 0xC), (0xE, 0x1F), (0x7F, 0x84), (0x86, 0x9F)];

#[inline]
fn in_ranges(ranges: &[(u32, u32)], cp: u32) -> bool {
    ranges
        .binary_search_by(|&(lo, hi)| {
            if hi < cp {
                Ordering::Less
            } else if lo > cp {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

#[inline]
fn ascii_class(c: char) -> Option<u8> {
    let cp = c as u32;
    if cp < 128 {
        Some(ASCII_CLASSES[cp as usize])
    } else {
        None
    }
}

/// NameStartChar
#[inline]
pub fn is_name_start_char(c: char) -> bool {
    match ascii_class(c) {
        Some(class) => class & NAME_START != 0,
        None => in_ranges(NAME_START_RANGES, c as u32),
    }
}

/// NameChar
#[inline]
pub fn is_name_char(c: char) -> bool {
    match ascii_class(c) {
        Some(class) => class & NAME != 0,
        None => {
            let cp = c as u32;
            in_ranges(NAME_START_RANGES, cp) || in_ranges(NAME_EXTRA_RANGES, cp)
        }
    }
}

/// The four XML whitespace characters (#x20, #x9, #xD, #xA)
#[inline]
pub fn is_whitespace(c: char) -> bool {
    matches!(ascii_class(c), Some(class) if class & WHITESPACE != 0)
}

/// XML 1.0 Char production
#[inline]
pub fn is_xml_char(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => true,
        _ if (c as u32) < 0x20 => false,
        _ if (c as u32) < 0x80 => true,
        _ => in_ranges(CHAR_RANGES, c as u32),
    }
}

/// XML 1.1 Char production (any code point except NUL, surrogates, #xFFFE, #xFFFF)
#[inline]
pub fn is_xml11_char(c: char) -> bool {
    let cp = c as u32;
    cp != 0 && cp != 0xFFFE && cp != 0xFFFF
}

/// Characters XML 1.1 only admits through character references
#[inline]
pub fn is_restricted_xml11_char(c: char) -> bool {
    in_ranges(RESTRICTED_11_RANGES, c as u32)
}

/// Validate a raw code point, e.g. one decoded from a character reference.
///
/// Surrogate halves (#xD800-#xDFFF) never name a character on their own; a
/// pair is only legal once it has been combined into a supplementary code
/// point, which `char::from_u32` takes care of.
pub fn code_point_to_char(cp: u32, xml11: bool) -> Option<char> {
    let c = char::from_u32(cp)?;
    let valid = if xml11 { is_xml11_char(c) } else { is_xml_char(c) };
    if valid {
        Some(c)
    } else {
        None
    }
}

/// PubidChar
#[inline]
pub fn is_pubid_char(c: char) -> bool {
    matches!(ascii_class(c), Some(class) if class & PUBID != 0)
}

/// Check a whole string against the Name production
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// True if every character is XML whitespace (an empty string counts)
pub fn is_all_whitespace(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

/// First character of `s` that is not an XML Char, if any
pub fn find_invalid_char(s: &str, xml11: bool) -> Option<char> {
    if xml11 {
        s.chars().find(|&c| !is_xml11_char(c) || is_restricted_xml11_char(c))
    } else {
        s.chars().find(|&c| !is_xml_char(c))
    }
}
