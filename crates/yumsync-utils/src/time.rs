use std::time::Duration;

/// Parses a compact duration string such as `30s`, `2m` or `1h30m`.
///
/// Each component is a run of digits followed by one of `s`, `m`, `h` or `d`.
/// Returns `None` for empty input, a dangling number, an unknown unit, or on
/// overflow.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use yumsync_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut chars = input.chars().peekable();

    while chars.peek().is_some() {
        let mut digits = String::new();
        while let Some(c) = chars.peek().copied() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            chars.next();
        }

        if digits.is_empty() {
            return None;
        }

        let number: u64 = digits.parse().ok()?;
        let unit: u64 = match chars.next()? {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(unit)?)?;
    }

    Some(Duration::from_secs(total))
}
