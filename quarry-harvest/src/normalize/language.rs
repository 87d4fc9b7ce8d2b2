/// English language names and their ISO-639-1 codes, covering the languages
/// that show up in EO metadata feeds.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("Bulgarian", "bg"),
    ("Croatian", "hr"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Estonian", "et"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Hungarian", "hu"),
    ("Italian", "it"),
    ("Latvian", "lv"),
    ("Lithuanian", "lt"),
    ("Norwegian", "no"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Romanian", "ro"),
    ("Slovak", "sk"),
    ("Slovenian", "sl"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
    ("Turkish", "tr"),
];

/// Maps an English language name to ISO-639-1 codes.
///
/// The capitalized name is matched by containment against the known names,
/// so a lowercase value like "english" still resolves. Unknown or absent
/// names yield an empty list.
pub fn language_codes(name_en: Option<&str>) -> Vec<String> {
    let Some(name) = name_en.map(str::trim).filter(|n| !n.is_empty()) else {
        return Vec::new();
    };

    let capitalized = capitalize(name);

    LANGUAGE_NAMES
        .iter()
        .filter(|(known, _)| known.contains(capitalized.as_str()))
        .map(|(_, code)| (*code).to_owned())
        .collect()
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(language_codes(Some("english")), vec!["en"]);
        assert_eq!(language_codes(Some("GERMAN")), vec!["de"]);
    }

    #[test]
    fn unknown_or_absent_names_yield_no_codes() {
        assert!(language_codes(Some("Klingon")).is_empty());
        assert!(language_codes(None).is_empty());
        assert!(language_codes(Some("  ")).is_empty());
    }
}
