/// Marker appended to truncated values.
const ELLIPSIS: &str = "...";

/// Caps a description at the provider's length limit.
///
/// When the description exceeds the limit, the result is exactly `limit`
/// characters long and ends with `...`. Counting is per character, so
/// multi-byte text never truncates mid-character.
pub fn truncate_notes(description: &str, limit: usize) -> String {
    if description.chars().count() <= limit {
        return description.to_owned();
    }

    let kept: String = description
        .chars()
        .take(limit.saturating_sub(ELLIPSIS.len()))
        .collect();

    format!("{kept}{ELLIPSIS}")
}

/// Appends a provider suffix to a title, keeping the result within the
/// catalog's title limit.
///
/// The suffix identifies the source (e.g. ` (odse)`) so datasets harvested
/// from different providers never collide on title. When the combination
/// exceeds the limit, the title part is truncated with `...` and the suffix
/// is preserved in full.
pub fn decorated_title(title: &str, suffix: &str, limit: usize) -> String {
    let title_len = title.chars().count();
    let suffix_len = suffix.chars().count();

    if title_len + suffix_len <= limit {
        return format!("{title}{suffix}");
    }

    let kept: String = title
        .chars()
        .take(limit.saturating_sub(suffix_len + ELLIPSIS.len()))
        .collect();

    format!("{kept}{ELLIPSIS}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_exactly_the_limit_with_marker() {
        let description = "x".repeat(1500);
        let notes = truncate_notes(&description, 1000);

        assert_eq!(notes.chars().count(), 1000);
        assert!(notes.ends_with("..."));
    }

    #[test]
    fn short_descriptions_pass_through() {
        assert_eq!(truncate_notes("short", 1000), "short");
    }

    #[test]
    fn exact_limit_is_not_truncated() {
        let description = "y".repeat(1000);
        assert_eq!(truncate_notes(&description, 1000), description);
    }

    #[test]
    fn decorated_title_appends_suffix() {
        assert_eq!(
            decorated_title("Land Cover", " (odse)", 200),
            "Land Cover (odse)"
        );
    }

    #[test]
    fn decorated_title_preserves_suffix_when_truncating() {
        let title = "t".repeat(250);
        let decorated = decorated_title(&title, " (odse)", 200);

        assert_eq!(decorated.chars().count(), 200);
        assert!(decorated.ends_with("... (odse)"));
    }
}
