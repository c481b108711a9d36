//! String-to-number coercion for cell values.
//!
//! Errors are plain reasons; the grid walker attaches the table and row.

/// Placeholder shown instead of a rating when too few votes were cast.
pub const MISSING_RATING: &str = "-";

/// Parse a vote count, dropping thousands separators ("12,345" -> 12345).
pub fn parse_votes(raw: &str) -> Result<u64, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<u64>()
        .map_err(|_| format!("vote count {:?} is not a non-negative integer", raw.trim()))
}

/// Vote count of a cell whose number is the text of a nested link.
///
/// No link means nobody in that bucket voted.
pub fn parse_linked_votes(link_text: Option<&str>) -> Result<u64, String> {
    match link_text {
        Some(text) => parse_votes(text),
        None => Ok(0),
    }
}

/// Parse a decimal rating; `-` is a missing rating, not zero.
pub fn parse_rating(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed == MISSING_RATING {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!("rating {:?} is not a number", trimmed)),
    }
}

/// Parse a histogram rating bucket, which must be a whole number in 1..=10.
pub fn parse_histogram_rating(raw: &str) -> Result<u8, String> {
    let trimmed = raw.trim();
    match trimmed.parse::<u8>() {
        Ok(value) if (1..=10).contains(&value) => Ok(value),
        _ => Err(format!("histogram rating {:?} is not in 1..=10", trimmed)),
    }
}
