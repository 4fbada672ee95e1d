//! Status text filtering for device records.

/// Maximum length (in characters) of status text written to a device.
pub const MAX_STATUS_LEN: usize = 64;

/// Truncate `msg` to [`MAX_STATUS_LEN`] characters, keeping the prefix.
pub fn filter_msg(msg: &str) -> String {
    truncate(msg, MAX_STATUS_LEN)
}

/// Keep the first `max` characters of `msg`.
pub fn truncate(msg: &str, max: usize) -> String {
    match msg.char_indices().nth(max) {
        Some((end, _)) => msg[..end].to_string(),
        None => msg.to_string(),
    }
}

/// Join two status strings with a comma separator.
pub(crate) fn append_status(a: &str, b: &str) -> String {
    if a.is_empty() {
        b.to_string()
    } else {
        format!("{a}, {b}")
    }
}
