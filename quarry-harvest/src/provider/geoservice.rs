use serde_json::Value;

use crate::ProviderProfile;
use crate::error::{HarvestError, HarvestResult};
use crate::normalize::language::language_codes;
use crate::normalize::temporal;
use crate::normalize::theme::{EO_THEMES, ThemeRules};
use crate::provider::{
    RawDataset, bounding_box_from, first_person_author, optional_str, required_str, split_keywords,
};

fn heuristics(_tag: &str) -> &'static [&'static str] {
    &[]
}

pub(super) const PROFILE: ProviderProfile = ProviderProfile {
    name: "geoservice",
    notes_limit: 1_000,
    title_limit: 200,
    decorate_title_with_org: false,
    title_suffix: None,
    fallback_tags: &[],
    default_language: &[],
    spatial_as_wkt: true,
    theme_rules: ThemeRules {
        vocabulary: EO_THEMES,
        lookup: &[],
        heuristics,
        fallback: "Remote Sensing",
    },
};

/// Extracts a schema.org-style data-asset record.
///
/// These records state their own classification (`additionalType`) and
/// language, so tag-based theme inference only applies when the
/// classification is absent.
pub(super) fn extract(record: &Value) -> HarvestResult<RawDataset> {
    let title = required_str(record, "name")?;
    let description = required_str(record, "description")?;

    let keywords = required_str(record, "keywords").map(|raw| split_keywords(&raw))?;

    let alternate_identifier = extract_doi(record);

    let (temporal_start, temporal_end) = temporal::parse_delimited(
        record.get("temporalCoverage").and_then(Value::as_str),
    )?;

    let spatial = extract_box(record)?;

    let language = record
        .get("inLanguage")
        .and_then(Value::as_str)
        .map(|name| language_codes(Some(name)));

    let themes = record
        .get("additionalType")
        .and_then(Value::as_str)
        .map(|theme| vec![theme.to_owned()]);

    Ok(RawDataset {
        title,
        description: Some(description),
        keywords: Some(keywords),
        url: optional_str(record, "url"),
        documentation: optional_str(record, "documentation"),
        license: optional_str(record, "license"),
        alternate_identifier,
        spatial,
        temporal_start,
        temporal_end,
        language,
        themes,
        contact_name: first_person_author(record),
        contact_email: optional_str(record, "contact"),
        ..RawDataset::default()
    })
}

/// Reads a DOI off the schema.org identifier block, if one is declared.
fn extract_doi(record: &Value) -> Option<String> {
    let identifier = record.get("identifier")?;
    if identifier.get("propertyID").and_then(Value::as_str) == Some("doi") {
        return identifier
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_owned);
    }

    None
}

/// Parses the space-delimited `spatialCoverage.geo.box` field.
fn extract_box(record: &Value) -> HarvestResult<Option<crate::normalize::geometry::BoundingBox>> {
    let Some(raw) = record
        .get("spatialCoverage")
        .and_then(|coverage| coverage.get("geo"))
        .and_then(|geo| geo.get("box"))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };

    let coordinates: Vec<f64> = raw
        .split_whitespace()
        .map(|part| {
            part.parse::<f64>().map_err(|_| {
                HarvestError::malformed("spatialCoverage", format!("non-numeric bound: `{part}`"))
            })
        })
        .collect::<HarvestResult<_>>()?;

    bounding_box_from(&coordinates, "spatialCoverage").map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "name": "TanDEM-X Forest Map",
            "description": "Global forest/non-forest map.",
            "keywords": "forest, radar, TanDEM-X",
            "url": "https://geoservice.example.org/forest",
            "documentation": "https://geoservice.example.org/forest/docs",
            "identifier": { "propertyID": "doi", "value": "10.1000/tdx-fnf" },
            "temporalCoverage": "2011-01-01/2015-12-31",
            "spatialCoverage": { "geo": { "box": "-180 -56 180 82" } },
            "inLanguage": "English",
            "additionalType": "Vegetation",
            "author": [{ "@type": "Person", "name": "F. Orester" }],
            "contact": "maps@example.org",
        })
    }

    #[test]
    fn extracts_the_full_schema_org_shape() {
        let dataset = extract(&record()).unwrap();

        assert_eq!(dataset.title, "TanDEM-X Forest Map");
        assert_eq!(dataset.alternate_identifier.as_deref(), Some("10.1000/tdx-fnf"));
        assert_eq!(dataset.temporal_start.as_deref(), Some("2011-01-01"));
        assert_eq!(dataset.temporal_end.as_deref(), Some("2015-12-31"));
        assert_eq!(dataset.language, Some(vec!["en".to_owned()]));
        assert_eq!(dataset.themes, Some(vec!["Vegetation".to_owned()]));
        assert_eq!(dataset.contact_name.as_deref(), Some("F. Orester"));

        let bounds = dataset.spatial.unwrap();
        assert_eq!((bounds.left, bounds.bottom), (-180.0, -56.0));
    }

    #[test]
    fn non_doi_identifiers_are_ignored() {
        let mut value = record();
        value["identifier"] = json!({ "propertyID": "ark", "value": "ark:/12025/x" });
        assert_eq!(extract(&value).unwrap().alternate_identifier, None);
    }

    #[test]
    fn missing_keywords_are_an_error() {
        let mut value = record();
        value.as_object_mut().unwrap().remove("keywords");
        assert!(matches!(
            extract(&value),
            Err(HarvestError::MissingField("keywords"))
        ));
    }

    #[test]
    fn open_ended_coverage_parses() {
        let mut value = record();
        value["temporalCoverage"] = json!("2018-08-30/..");
        let dataset = extract(&value).unwrap();
        assert_eq!(dataset.temporal_start.as_deref(), Some("2018-08-30"));
        assert_eq!(dataset.temporal_end, None);
    }
}
