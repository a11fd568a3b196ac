/// Expand a compact CamelCase key into a display label by inserting a space
/// before every interior capital letter ("LotusSchool" -> "Lotus School").
///
/// The transform is deterministic, so a label always maps back to exactly one
/// key as long as the key itself travels alongside it.
pub fn spaced_label(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            label.push(' ');
        }
        label.push(c);
    }
    label.trim().to_string()
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a raw contact number for display.
/// Handles various input formats and normalizes to (XXX) XXX-XXXX
pub fn format_phone(phone: &str) -> String {
    // Extract just the digits
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        10 => format!(
            "({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10]
        ),
        11 if digits.starts_with('1') => format!(
            "({}) {}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..11]
        ),
        _ => phone.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaced_label() {
        assert_eq!(spaced_label("LotusSchool"), "Lotus School");
        assert_eq!(spaced_label("MapleRidgeCampus"), "Maple Ridge Campus");
        assert_eq!(spaced_label("North"), "North");
        assert_eq!(spaced_label(""), "");
        // Lowercase keys pass through untouched
        assert_eq!(spaced_label("grade5"), "grade5");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Lotus School", "lot"));
        assert!(contains_ignore_case("Lotus School", "SCHOOL"));
        assert!(!contains_ignore_case("Lotus School", "maple"));
        // Empty needle matches anything; callers gate on empty input
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("15551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }
}
