//! Objective-C to Swift type name mapping

use once_cell::sync::Lazy;
use regex::Regex;

/// Primitive and aliased Objective-C type names with their Swift spelling.
/// Anything not listed passes through unchanged.
pub static TYPE_MAPPINGS: &[(&str, &str)] = &[
    ("void", "Void"),
    ("int", "Int"),
    ("unsigned", "UInt"),
    ("NSInteger", "Int"),
    ("NSUInteger", "UInt"),
    ("SInt8", "Int8"),
    ("int8_t", "Int8"),
    ("uint8_t", "UInt8"),
    ("SInt16", "Int16"),
    ("int16_t", "Int16"),
    ("uint16_t", "UInt16"),
    ("SInt32", "Int32"),
    ("int32_t", "Int32"),
    ("uint32_t", "UInt32"),
    ("SInt64", "Int64"),
    ("int64_t", "Int64"),
    ("uint64_t", "UInt64"),
    ("BOOL", "Bool"),
    ("bool", "Bool"),
    ("char", "UInt8"),
    ("float", "Float"),
    ("double", "Double"),
    ("NSString", "String"),
];

/// `NSError**` out-parameters have a dedicated Swift type
const ERROR_OUT_PARAM: &str = "NSError**";
const ERROR_POINTER_TYPE: &str = "NSErrorPointer";

static PROTOCOL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^id\s*<\s*(\w+)\s*>$").unwrap());

/// Look up a bare type name in `TYPE_MAPPINGS`
pub fn map_type_name(name: &str) -> &str {
    TYPE_MAPPINGS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Convert an Objective-C type spelling to its Swift equivalent.
///
/// - `NSError**` becomes `NSErrorPointer`
/// - a trailing `*` marks the result optional: `NSString*` becomes `String?`
/// - `id<Proto>` collapses to `Proto` and is never optional, even as a pointer
pub fn resolve_type(spelling: &str) -> String {
    let spelling = spelling.trim();
    if spelling.split_whitespace().collect::<String>() == ERROR_OUT_PARAM {
        return ERROR_POINTER_TYPE.to_string();
    }

    let (base, is_pointer) = match spelling.strip_suffix('*') {
        Some(base) => (base.trim_end(), true),
        None => (spelling, false),
    };

    if let Some(caps) = PROTOCOL_RE.captures(base) {
        return caps[1].to_string();
    }

    let mut resolved = map_type_name(base).to_string();
    if is_pointer {
        resolved.push('?');
    }
    resolved
}
