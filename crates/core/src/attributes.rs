//! CloudEvents attribute naming rules and well-known attribute names

/// The only envelope spec version this mesh accepts.
pub const SPEC_VERSION: &str = "1.0";

pub const ATTR_ID: &str = "id";
pub const ATTR_SOURCE: &str = "source";
pub const ATTR_SPEC_VERSION: &str = "specversion";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_TIME: &str = "time";
pub const ATTR_SUBJECT: &str = "subject";
pub const ATTR_DATA_CONTENT_TYPE: &str = "datacontenttype";
pub const ATTR_DATA_SCHEMA: &str = "dataschema";
pub const ATTR_DATA: &str = "data";

/// Extension attribute naming the correlation partition key.
pub const EXT_CORRELATION_ID: &str = "correlationid";
/// Extension attribute naming the causation partition key.
pub const EXT_CAUSATION_ID: &str = "causationid";

/// Envelope attributes that are not extensions.
pub const CONTEXT_ATTRIBUTES: &[&str] = &[
    ATTR_ID,
    ATTR_SOURCE,
    ATTR_SPEC_VERSION,
    ATTR_TYPE,
    ATTR_TIME,
    ATTR_SUBJECT,
    ATTR_DATA_CONTENT_TYPE,
    ATTR_DATA_SCHEMA,
    ATTR_DATA,
];

/// Longest extension attribute name the envelope namespace allows.
pub const MAX_EXTENSION_NAME_LEN: usize = 20;

/// Attribute names are case-insensitive; the stored form is lowercase.
pub fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Extension names: 1..=20 chars drawn from lowercase ASCII letters and
/// digits, and not one of the reserved context attribute names.
pub fn is_valid_extension_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_EXTENSION_NAME_LEN {
        return false;
    }
    if CONTEXT_ATTRIBUTES.contains(&name) {
        return false;
    }
    name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// `source` and `dataschema` are URI references: non-empty, no whitespace
/// or control characters. Relative references are allowed by the envelope
/// spec, so no scheme is required.
pub fn is_valid_uri_ref(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(|c| c.is_whitespace() || c.is_control())
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
