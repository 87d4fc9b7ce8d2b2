use std::sync::OnceLock;

use regex::Regex;

/// Character class the catalog accepts in tags: alphanumerics, spaces,
/// underscores, dots, and hyphens.
const TAG_PATTERN: &str = r"^[A-Za-z0-9 _.-]+$";

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| Regex::new(TAG_PATTERN).expect("tag pattern must compile"))
}

/// Keywords split by catalog conformance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagPartition {
    /// Keywords the catalog accepts as tags.
    pub tags: Vec<String>,
    /// Keywords that failed the character rules; published as extra
    /// metadata instead of being dropped.
    pub custom_tags: Vec<String>,
}

/// Splits raw keywords into conforming tags and the remainder.
///
/// Tokens are whitespace-trimmed; order and case are preserved within each
/// output list. Blank tokens are discarded.
pub fn partition_tags<I, S>(keywords: I) -> TagPartition
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut partition = TagPartition::default();

    for keyword in keywords {
        let token = keyword.as_ref().trim();
        if token.is_empty() {
            continue;
        }

        if tag_regex().is_match(token) {
            partition.tags.push(token.to_owned());
        } else {
            partition.custom_tags.push(token.to_owned());
        }
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_conforming_and_custom_tags() {
        let partition = partition_tags(["good-tag", "bad tag!", "ok.tag_1"]);
        assert_eq!(partition.tags, vec!["good-tag", "ok.tag_1"]);
        assert_eq!(partition.custom_tags, vec!["bad tag!"]);
    }

    #[test]
    fn trims_tokens_and_preserves_case() {
        let partition = partition_tags(["  Land Cover ", "SAR"]);
        assert_eq!(partition.tags, vec!["Land Cover", "SAR"]);
        assert!(partition.custom_tags.is_empty());
    }

    #[test]
    fn empty_input_yields_two_empty_sets() {
        let partition = partition_tags(Vec::<String>::new());
        assert!(partition.tags.is_empty());
        assert!(partition.custom_tags.is_empty());
    }

    #[test]
    fn blank_tokens_are_discarded() {
        let partition = partition_tags(["", "  ", "water"]);
        assert_eq!(partition.tags, vec!["water"]);
        assert!(partition.custom_tags.is_empty());
    }
}
