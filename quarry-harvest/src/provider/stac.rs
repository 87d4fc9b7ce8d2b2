use serde_json::Value;

use crate::error::{HarvestError, HarvestResult};
use crate::normalize::theme::{EO_THEMES, ThemeRules};
use crate::provider::{
    RawDataset, bounding_box_from, first_person_author, optional_str, required_str,
};
use crate::{ProviderProfile, normalize::temporal};

/// Keyword conventions seen across public STAC endpoints.
const LOOKUP: &[(&str, &[&str])] = &[
    ("Satellite", &["Imagery"]),
    ("landsat", &["Imagery"]),
    ("sentinel", &["Imagery"]),
    ("ard", &["Imagery"]),
    ("COG", &["Imagery"]),
    ("HREA", &["Imagery"]),
    ("Remote Sensing", &["Imagery"]),
    ("Precipitation", &["Imagery"]),
    ("Wetlands", &["Water", "Biodiversity"]),
    ("land", &["Land Use"]),
];

fn heuristics(tag: &str) -> &'static [&'static str] {
    let lowered = tag.to_lowercase();

    if lowered.contains("landcover") {
        &["Land Cover"]
    } else if lowered.contains("fire") {
        &["Fire"]
    } else if lowered.contains("flood") {
        &["Climate"]
    } else if lowered.contains("soil") {
        &["Soils"]
    } else if lowered.contains("terrain") || lowered.contains("dtm") {
        &["DEM"]
    } else if lowered.contains("tropomi") {
        &["Air Quality", "Climate"]
    } else if lowered.contains("temperature") {
        &["Temperature"]
    } else if lowered.contains("vegetation") {
        &["Vegetation"]
    } else if lowered.starts_with("air") {
        &["Air Quality"]
    } else if lowered.starts_with("building") {
        &["Land Use"]
    } else {
        &[]
    }
}

pub(super) const PROFILE: ProviderProfile = ProviderProfile {
    name: "stac",
    notes_limit: 10_000,
    title_limit: 200,
    decorate_title_with_org: true,
    title_suffix: None,
    fallback_tags: &["Remote Sensing"],
    default_language: &["en"],
    spatial_as_wkt: false,
    theme_rules: ThemeRules {
        vocabulary: EO_THEMES,
        lookup: LOOKUP,
        heuristics,
        fallback: "Remote Sensing",
    },
};

/// Extracts a collection record served by a STAC API.
pub(super) fn extract_api(record: &Value) -> HarvestResult<RawDataset> {
    let mut dataset = extract_common(record)?;

    // Alternate identifiers, documentation, license, and the raw metadata
    // document are all announced through link relations.
    if let Some(links) = record.get("links").and_then(Value::as_array) {
        for link in links {
            let (Some(rel), Some(href)) = (
                link.get("rel").and_then(Value::as_str),
                link.get("href").and_then(Value::as_str),
            ) else {
                continue;
            };

            match rel {
                "cite-as" | "about" => {
                    dataset.alternate_identifier = Some(href.to_owned());
                    dataset.url = Some(href.to_owned());
                }
                "describedby" => dataset.documentation = Some(href.to_owned()),
                "license" => dataset.license = Some(href.to_owned()),
                "self" => dataset.raw_metadata_url = Some(href.to_owned()),
                _ => {}
            }
        }
    }

    // A producer URL stands in when no citation link was present.
    if dataset.url.is_none()
        && let Some(providers) = record.get("providers").and_then(Value::as_array)
    {
        for provider in providers {
            let is_producer = provider
                .get("roles")
                .and_then(Value::as_array)
                .is_some_and(|roles| roles.iter().any(|role| role.as_str() == Some("producer")));

            if is_producer && let Some(url) = optional_str(provider, "url") {
                dataset.url = Some(url);
                break;
            }
        }
    }

    dataset.contact_name = first_person_author(record);
    dataset.contact_email = optional_str(record, "contact");

    Ok(dataset)
}

/// Extracts a collection record of a static STAC catalog.
///
/// Static catalogs carry no usable link relations; the collection document
/// address is derived from the configured base URLs instead.
pub(super) fn extract_catalog(
    record: &Value,
    base_url: &str,
    public_url: &str,
) -> HarvestResult<RawDataset> {
    let mut dataset = extract_common(record)?;

    let id = required_str(record, "id")?;
    dataset.url = Some(collection_url(base_url, &id));
    dataset.documentation = Some(collection_url(public_url, &id));
    dataset.license = optional_str(record, "license");
    dataset.contact_name = optional_str(record, "contact_name");
    dataset.contact_email = optional_str(record, "contact_email");

    Ok(dataset)
}

/// Extraction shared by both STAC flavors: title, description, keywords,
/// and the extent block.
fn extract_common(record: &Value) -> HarvestResult<RawDataset> {
    let title = required_str(record, "title")?;
    let description = required_str(record, "description")?;

    let keywords = record.get("keywords").and_then(Value::as_array).map(|list| {
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect()
    });

    let extent = record
        .get("extent")
        .ok_or(HarvestError::MissingField("extent"))?;

    let (temporal_start, temporal_end) =
        temporal::parse_interval_list(extent.get("temporal").unwrap_or(&Value::Null))?;

    let spatial = extract_first_bbox(extent)?;

    Ok(RawDataset {
        title,
        description: Some(description),
        keywords,
        temporal_start,
        temporal_end,
        spatial,
        ..RawDataset::default()
    })
}

/// Reads the first bounding box of the spatial extent, if any.
fn extract_first_bbox(
    extent: &Value,
) -> HarvestResult<Option<crate::normalize::geometry::BoundingBox>> {
    let Some(first) = extent
        .get("spatial")
        .and_then(|spatial| spatial.get("bbox"))
        .and_then(Value::as_array)
        .and_then(|boxes| boxes.first())
    else {
        return Ok(None);
    };

    let coordinates: Vec<f64> = first
        .as_array()
        .ok_or_else(|| HarvestError::malformed("bbox", format!("not a coordinate list: {first}")))?
        .iter()
        .map(|value| {
            value
                .as_f64()
                .ok_or_else(|| HarvestError::malformed("bbox", format!("non-numeric bound: {value}")))
        })
        .collect::<HarvestResult<_>>()?;

    bounding_box_from(&coordinates, "bbox").map(Some)
}

fn collection_url(base: &str, id: &str) -> String {
    format!("{}/{id}/collection.json", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_record() -> Value {
        json!({
            "title": "Sentinel-2 L2A",
            "description": "Atmospherically corrected imagery.",
            "keywords": ["sentinel", "Water"],
            "extent": {
                "temporal": { "interval": [["2015-06-23", null]] },
                "spatial": { "bbox": [[-180.0, -90.0, 180.0, 90.0]] },
            },
            "links": [
                { "rel": "self", "href": "https://stac.example.org/collections/s2-l2a" },
                { "rel": "license", "href": "https://example.org/license.pdf" },
                { "rel": "about", "href": "https://doi.org/10.1000/s2" },
            ],
            "providers": [
                { "name": "ESA", "roles": ["producer"], "url": "https://esa.int" },
            ],
            "author": [{ "@type": "Person", "name": "A. Cartographer" }],
            "contact": "eo@example.org",
        })
    }

    #[test]
    fn api_records_map_link_relations() {
        let dataset = extract_api(&api_record()).unwrap();

        assert_eq!(dataset.title, "Sentinel-2 L2A");
        assert_eq!(
            dataset.raw_metadata_url.as_deref(),
            Some("https://stac.example.org/collections/s2-l2a")
        );
        assert_eq!(
            dataset.license.as_deref(),
            Some("https://example.org/license.pdf")
        );
        // The citation link wins over the producer URL.
        assert_eq!(dataset.url.as_deref(), Some("https://doi.org/10.1000/s2"));
        assert_eq!(dataset.contact_name.as_deref(), Some("A. Cartographer"));
        assert_eq!(dataset.contact_email.as_deref(), Some("eo@example.org"));
        assert_eq!(dataset.temporal_start.as_deref(), Some("2015-06-23"));
        assert_eq!(dataset.temporal_end, None);
        assert!(dataset.spatial.is_some());
    }

    #[test]
    fn producer_url_backfills_a_missing_citation() {
        let mut record = api_record();
        record["links"] = json!([]);

        let dataset = extract_api(&record).unwrap();
        assert_eq!(dataset.url.as_deref(), Some("https://esa.int"));
        assert_eq!(dataset.alternate_identifier, None);
    }

    #[test]
    fn missing_title_is_an_error() {
        let mut record = api_record();
        record.as_object_mut().unwrap().remove("title");

        assert!(matches!(
            extract_api(&record),
            Err(HarvestError::MissingField("title"))
        ));
    }

    #[test]
    fn malformed_bbox_is_an_error() {
        let mut record = api_record();
        record["extent"]["spatial"]["bbox"] = json!([[0.0, 1.0]]);

        assert!(matches!(
            extract_api(&record),
            Err(HarvestError::MalformedField { field: "bbox", .. })
        ));
    }

    #[test]
    fn catalog_records_derive_urls_from_the_bases() {
        let record = json!({
            "id": "land-cover",
            "title": "Land Cover",
            "description": "Annual land cover mosaics.",
            "extent": { "temporal": { "interval": [] } },
        });

        let dataset = extract_catalog(
            &record,
            "https://internal.example.org/catalog/",
            "https://stac.example.org/catalog",
        )
        .unwrap();

        assert_eq!(
            dataset.url.as_deref(),
            Some("https://internal.example.org/catalog/land-cover/collection.json")
        );
        assert_eq!(
            dataset.documentation.as_deref(),
            Some("https://stac.example.org/catalog/land-cover/collection.json")
        );
    }
}
