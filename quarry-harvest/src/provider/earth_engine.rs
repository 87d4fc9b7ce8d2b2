use serde_json::Value;

use crate::error::{HarvestError, HarvestResult};
use crate::normalize::theme::{EO_THEMES, ThemeRules};
use crate::provider::{RawDataset, bounding_box_from, optional_str, required_str, split_keywords};
use crate::ProviderProfile;

/// Common Earth Engine catalog tags mapped into the theme vocabulary.
const LOOKUP: &[(&str, &[&str])] = &[
    ("biodiversity", &["Biodiversity"]),
    ("cloud", &["Weather"]),
    ("climate", &["Climate"]),
    ("air_quality", &["Air Quality"]),
    ("radiation", &["Weather"]),
    ("reflectance", &["Weather"]),
    ("landcover", &["Land Cover"]),
    ("agriculture", &["Vegetation"]),
    ("fishing", &["Biodiversity"]),
    ("forest", &["Vegetation"]),
    ("elevation", &["DEM"]),
    ("dem", &["DEM"]),
    ("soil", &["Soils"]),
    ("fire", &["Fire"]),
    ("coastal", &["Water"]),
    ("crop", &["Vegetation"]),
    ("built", &["Land Use"]),
    ("built_up", &["Land Use"]),
    ("building", &["Land Use"]),
    ("atmosphere", &["Climate"]),
    ("ocean", &["Climate"]),
    ("air_temperature", &["Temperature"]),
    ("orthophoto", &["Imagery"]),
    ("landsat", &["Imagery"]),
    ("modis", &["Imagery"]),
    ("sentinel", &["Imagery"]),
    ("multispectral", &["Imagery"]),
    ("climate_change", &["Climate"]),
    ("ice", &["Climate"]),
    ("hydrology", &["Water"]),
    ("biomass", &["Biomass"]),
    ("demography", &["Demographics"]),
    ("census", &["Demographics"]),
    ("bathymetry", &["Water"]),
    ("water", &["Water"]),
    ("surface_temperature", &["Temperature"]),
    ("sar", &["SAR"]),
];

fn heuristics(_tag: &str) -> &'static [&'static str] {
    &[]
}

pub(super) const PROFILE: ProviderProfile = ProviderProfile {
    name: "earth-engine",
    notes_limit: 1_000,
    title_limit: 200,
    decorate_title_with_org: false,
    title_suffix: Some(" by Google Earth Engine"),
    fallback_tags: &["Imagery"],
    default_language: &["en"],
    spatial_as_wkt: false,
    theme_rules: ThemeRules {
        vocabulary: EO_THEMES,
        lookup: LOOKUP,
        heuristics,
        fallback: "Imagery",
    },
};

/// Extracts an Earth Engine catalog entry.
///
/// Entries flagged deprecated are not harvested. The catalog entry itself
/// only carries a one-line name; the full description lives in the linked
/// collection document and is fetched during ingestion.
pub(super) fn extract(record: &Value) -> HarvestResult<Option<RawDataset>> {
    if record.get("deprecated").is_some_and(is_truthy) {
        return Ok(None);
    }

    let title = required_str(record, "title")?;

    let keywords = record
        .get("keywords")
        .and_then(Value::as_str)
        .map(split_keywords);

    let spatial = match record.get("bbox").and_then(Value::as_str) {
        Some(raw) => {
            let coordinates: Vec<f64> = raw
                .split(',')
                .map(|part| {
                    part.trim().parse::<f64>().map_err(|_| {
                        HarvestError::malformed("bbox", format!("non-numeric bound: `{part}`"))
                    })
                })
                .collect::<HarvestResult<_>>()?;
            Some(bounding_box_from(&coordinates, "bbox")?)
        }
        None => None,
    };

    let description_href = optional_str(record, "catalog");

    Ok(Some(RawDataset {
        title,
        description: None,
        description_href: description_href.clone(),
        keywords,
        url: optional_str(record, "url"),
        license: optional_str(record, "license"),
        alternate_identifier: optional_str(record, "id"),
        spatial,
        temporal_start: optional_str(record, "start_date"),
        temporal_end: optional_str(record, "end_date"),
        raw_metadata_url: description_href,
        ..RawDataset::default()
    }))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => !text.is_empty(),
        Value::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deprecated_entries_are_skipped() {
        let record = json!({ "title": "Old Mosaic", "deprecated": true });
        assert!(extract(&record).unwrap().is_none());
    }

    #[test]
    fn comma_delimited_fields_are_split() {
        let record = json!({
            "title": "Night Lights",
            "keywords": "dmsp, lights, nighttime",
            "bbox": "-180, -65, 180, 75",
            "catalog": "https://earth.example.org/night-lights.json",
            "start_date": "1992-01-01",
        });

        let dataset = extract(&record).unwrap().unwrap();
        assert_eq!(
            dataset.keywords,
            Some(vec![
                "dmsp".to_owned(),
                "lights".to_owned(),
                "nighttime".to_owned()
            ])
        );
        let bounds = dataset.spatial.unwrap();
        assert_eq!((bounds.left, bounds.top), (-180.0, 75.0));
        assert_eq!(
            dataset.raw_metadata_url.as_deref(),
            Some("https://earth.example.org/night-lights.json")
        );
        assert_eq!(dataset.temporal_start.as_deref(), Some("1992-01-01"));
        assert_eq!(dataset.temporal_end, None);
    }

    #[test]
    fn malformed_bbox_string_is_an_error() {
        let record = json!({ "title": "Broken", "bbox": "-180, x, 180, 75" });
        assert!(matches!(
            extract(&record),
            Err(HarvestError::MalformedField { field: "bbox", .. })
        ));
    }
}
