/// Converts a title into a URL-safe slug.
///
/// Lowercases the input, drops every character that is not a letter, a
/// digit, or a separator, and collapses runs of whitespace and hyphens into
/// a single hyphen. Hyphens count as separators so the function is
/// idempotent: slugifying a slug returns it unchanged.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        assert_eq!(slugify("  Hello, World!  "), "hello-world");
    }

    #[test]
    fn is_idempotent() {
        let once = slugify("Sentinel-2 L2A — Surface Reflectance");
        assert_eq!(slugify(&once), once);
        assert_eq!(slugify("hello-world"), "hello-world");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Landsat 8 Collection 2"), "landsat-8-collection-2");
    }

    #[test]
    fn empty_and_symbol_only_titles_produce_empty_slugs() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
