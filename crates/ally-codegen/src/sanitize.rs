//! Identifier and string-literal sanitizing.
//!
//! Every piece of free text that ends up inside the generated Python document
//! goes through one of these functions. They are total: any input produces an
//! output, and distinct inputs may collide.

/// Convert a free-text name into a Python identifier fragment.
///
/// Characters outside `[A-Za-z0-9_]` and whitespace are dropped, whitespace
/// runs become a single `_` (leading and trailing whitespace vanish), and the
/// result is lower-cased.
///
/// ```
/// use ally_codegen::sanitize::to_identifier;
/// assert_eq!(to_identifier("Random Number!"), "random_number");
/// ```
pub fn to_identifier(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase()
}

/// Escape text for embedding in a single-line Python string literal.
///
/// Backslashes are escaped first so the quote escapes added afterwards are not
/// doubled. Line breaks then become spaces, whitespace runs collapse to one
/// space, and the result is trimmed.
pub fn escape_for_string_literal(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\'");

    let single_line = escaped
        .replace("\r\n", " ")
        .replace('\n', " ")
        .replace('\r', " ");

    single_line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Manifest description for an exported agent.
pub fn derive_export_description(entity_name: &str) -> String {
    format!(
        "Call this tool for tasks related to {}.",
        entity_name.to_lowercase()
    )
}

/// Manifest export name for an agent identifier.
pub fn export_name(identifier: &str) -> String {
    format!("get_{identifier}_from_specialist_agent")
}

/// `identifier` with a leading `_` when it starts with a digit.
///
/// [`to_identifier`] keeps leading digits, which Python does not accept at the
/// start of a name.
pub fn bindable_name(identifier: &str) -> String {
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{identifier}")
    } else {
        identifier.to_string()
    }
}

/// Module-level variable holding the wrapper agent.
pub fn agent_variable(identifier: &str) -> String {
    format!("{}_agent", bindable_name(identifier))
}
