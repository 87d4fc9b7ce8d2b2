/// Controlled vocabulary of EO dataset themes.
pub const EO_THEMES: &[&str] = &[
    "Air Quality",
    "Biodiversity",
    "Biomass",
    "Vegetation",
    "Climate",
    "DEM",
    "Demographics",
    "Fire",
    "Imagery",
    "Infrastructure",
    "Land Use",
    "Land Cover",
    "SAR",
    "Snow",
    "Soils",
    "Solar",
    "Temperature",
    "Water",
    "Weather",
];

/// Theme assignment rules for one provider.
///
/// The classification is intentionally heuristic: each source community uses
/// its own keyword conventions, so the lookup table and the substring rules
/// differ per provider while the vocabulary and the matching order stay
/// fixed.
pub struct ThemeRules {
    /// Controlled vocabulary the themes are drawn from.
    pub vocabulary: &'static [&'static str],
    /// Provider keyword to theme(s) table, matched case-sensitively.
    pub lookup: &'static [(&'static str, &'static [&'static str])],
    /// Provider substring/prefix rules applied when nothing else matched.
    pub heuristics: fn(&str) -> &'static [&'static str],
    /// Theme assigned when no tag matched any rule.
    pub fallback: &'static str,
}

impl ThemeRules {
    /// Classifies a tag list into themes.
    ///
    /// Per tag, the first matching rule wins: exact vocabulary hit,
    /// title-cased vocabulary hit, lookup-table hit, provider heuristics.
    /// The result is deduplicated preserving first-seen order; an empty
    /// result gets the fallback theme.
    pub fn classify<S: AsRef<str>>(&self, tags: &[S]) -> Vec<String> {
        let mut themes: Vec<String> = Vec::new();

        for tag in tags {
            let tag = tag.as_ref();

            if self.vocabulary.contains(&tag) {
                push_unique(&mut themes, tag);
                continue;
            }

            let titled = title_case(tag);
            if self.vocabulary.contains(&titled.as_str()) {
                push_unique(&mut themes, &titled);
                continue;
            }

            if let Some((_, mapped)) = self.lookup.iter().find(|(keyword, _)| *keyword == tag) {
                for theme in *mapped {
                    push_unique(&mut themes, theme);
                }
                continue;
            }

            for theme in (self.heuristics)(tag) {
                push_unique(&mut themes, theme);
            }
        }

        if themes.is_empty() {
            themes.push(self.fallback.to_owned());
        }

        themes
    }
}

fn push_unique(themes: &mut Vec<String>, theme: &str) {
    if !themes.iter().any(|t| t == theme) {
        themes.push(theme.to_owned());
    }
}

/// Title-cases a string: every letter that follows a non-letter is
/// uppercased, every other letter lowercased.
pub fn title_case(s: &str) -> String {
    let mut titled = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            titled.push(c);
            at_word_start = true;
        }
    }

    titled
}
