use crate::error::{TrackerError, TrackerResult};

/// Format seconds as `HH:MM:SS`. Hours grow past 99 instead of wrapping.
pub fn encode(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parse `SS`, `MM:SS` or `HH:MM:SS` into seconds
///
/// Fields are not range checked, so `"00:75:00"` is 4500 seconds.
pub fn decode(text: &str) -> TrackerResult<u64> {
    let fields = text
        .split(':')
        .map(|field| parse_field(field, text))
        .collect::<TrackerResult<Vec<u64>>>()?;

    let total = match fields.as_slice() {
        [s] => Some(*s),
        [m, s] => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
        [h, m, s] => h
            .checked_mul(3600)
            .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(*s)),
        _ => {
            return Err(TrackerError::Validation(format!(
                "duration {:?} must be SS, MM:SS or HH:MM:SS",
                text
            )))
        }
    };

    total.ok_or_else(|| TrackerError::Validation(format!("duration {:?} is too large", text)))
}

fn parse_field(field: &str, text: &str) -> TrackerResult<u64> {
    let field = field.trim();
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(TrackerError::Validation(format!(
            "duration {:?} has a non-numeric field",
            text
        )));
    }
    field
        .parse::<u64>()
        .map_err(|_| TrackerError::Validation(format!("duration {:?} is too large", text)))
}
