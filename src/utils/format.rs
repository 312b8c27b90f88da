//! Text formatting for counter values

/// Render a counter value with at least two digits
pub fn make_time_text(value: u32) -> String {
    format!("{:02}", value)
}
