use soroban_sdk::String;

/// Returns true when the string carries at least one byte. Optional text
/// fields are modeled as empty strings, so this doubles as a presence check.
pub fn non_empty(text: &String) -> bool {
    text.len() > 0
}

/// A clinical record must carry at least one non-empty payload field;
/// otherwise there is nothing to store and the row is rejected.
pub fn payload_present(fields: &[&String]) -> bool {
    fields.iter().any(|field| non_empty(field))
}

/// An optional [from, to] time window is valid when both bounds, if present,
/// are ordered.
pub fn range_valid(from: Option<u64>, to: Option<u64>) -> bool {
    match (from, to) {
        (Some(from), Some(to)) => from <= to,
        _ => true,
    }
}
