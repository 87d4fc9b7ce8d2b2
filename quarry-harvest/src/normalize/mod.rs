//! Reduction of heterogeneous source records to the catalog dataset shape.
//!
//! Each step is a small pure function; [`normalize`] wires them together
//! under the active provider profile.

pub mod geometry;
pub mod language;
mod notes;
mod slug;
mod tags;
pub mod temporal;
pub mod theme;

pub use notes::*;
pub use slug::*;
pub use tags::*;

use quarry_catalog::{DatasetSpec, Spatial};

use crate::provider::{ProviderProfile, RawDataset};

/// Normalizes an extracted record into the catalog dataset shape.
///
/// Applies the provider profile's title decoration and limits, derives the
/// slug, caps the description, partitions keywords, classifies themes, and
/// renders the spatial extent in the representation the provider publishes.
/// Harvested datasets are always public.
pub fn normalize(raw: RawDataset, profile: &ProviderProfile, organization: &str) -> DatasetSpec {
    let title = match (profile.decorate_title_with_org, profile.title_suffix) {
        (true, _) => decorated_title(
            &raw.title,
            &format!(" ({organization})"),
            profile.title_limit,
        ),
        (false, Some(suffix)) => decorated_title(&raw.title, suffix, profile.title_limit),
        (false, None) => raw.title.clone(),
    };
    let name = slugify(&title);

    // Records without a description are published with their title as the
    // abstract rather than an empty one.
    let notes = truncate_notes(
        raw.description.as_deref().unwrap_or(&raw.title),
        profile.notes_limit,
    );

    let (tags, custom_tags) = match raw.keywords {
        Some(keywords) => {
            let partition = partition_tags(&keywords);
            let custom = (!partition.custom_tags.is_empty()).then_some(partition.custom_tags);
            (partition.tags, custom)
        }
        // At least one tag must be present for the catalog to index on.
        None => (
            profile
                .fallback_tags
                .iter()
                .map(|tag| (*tag).to_owned())
                .collect(),
            None,
        ),
    };

    // Some sources carry an explicit classification; everything else is
    // inferred from the conforming tags.
    let theme = match raw.themes {
        Some(themes) if !themes.is_empty() => themes,
        _ => profile.theme_rules.classify(&tags),
    };

    let language = raw.language.unwrap_or_else(|| {
        profile
            .default_language
            .iter()
            .map(|code| (*code).to_owned())
            .collect()
    });

    let spatial = raw.spatial.map(|bounds| {
        if profile.spatial_as_wkt {
            Spatial::Wkt(bounds.to_wkt())
        } else {
            Spatial::GeoJson(bounds.to_geojson())
        }
    });

    DatasetSpec {
        title,
        name,
        notes,
        url: raw.url,
        private: false,
        tags,
        custom_tags,
        theme,
        language,
        spatial,
        temporal_start: raw.temporal_start,
        temporal_end: raw.temporal_end,
        license: raw.license,
        documentation: raw.documentation,
        alternate_identifier: raw.alternate_identifier,
        contact_name: raw.contact_name,
        contact_email: raw.contact_email,
    }
}

#[cfg(test)]
mod tests {
    use super::geometry::BoundingBox;
    use super::*;
    use crate::provider::ProviderKind;

    fn raw(title: &str) -> RawDataset {
        RawDataset {
            title: title.to_owned(),
            ..RawDataset::default()
        }
    }

    #[test]
    fn derives_slug_from_decorated_title_and_stays_public() {
        let profile = ProviderKind::StacApi.profile();
        let dataset = normalize(raw("Sentinel-2 L2A"), &profile, "eo-lake");

        assert_eq!(dataset.title, "Sentinel-2 L2A (eo-lake)");
        assert_eq!(dataset.name, "sentinel-2-l2a-eo-lake");
        assert!(!dataset.private);
    }

    #[test]
    fn missing_keywords_fall_back_to_the_profile_tags() {
        let profile = ProviderKind::StacApi.profile();
        let dataset = normalize(raw("Unlabeled"), &profile, "eo-lake");

        assert_eq!(dataset.tags, vec!["Remote Sensing"]);
        assert_eq!(dataset.custom_tags, None);
        // The fallback tag itself classifies into the imagery theme.
        assert_eq!(dataset.theme, vec!["Imagery"]);
    }

    #[test]
    fn non_conforming_keywords_move_to_custom_tags() {
        let profile = ProviderKind::StacApi.profile();
        let mut record = raw("Tagged");
        record.keywords = Some(vec!["water".to_owned(), "café/au/lait".to_owned()]);

        let dataset = normalize(record, &profile, "eo-lake");
        assert_eq!(dataset.tags, vec!["water"]);
        assert_eq!(dataset.custom_tags, Some(vec!["café/au/lait".to_owned()]));
    }

    #[test]
    fn missing_description_falls_back_to_the_title() {
        let profile = ProviderKind::EarthEngine.profile();
        let dataset = normalize(raw("Night Lights"), &profile, "eo-lake");

        assert_eq!(dataset.notes, "Night Lights");
    }

    #[test]
    fn spatial_rendering_follows_the_profile() {
        let mut geoservice_record = raw("Boxed");
        geoservice_record.spatial = Some(BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let dataset = normalize(
            geoservice_record,
            &ProviderKind::Geoservice.profile(),
            "eo-lake",
        );
        assert!(matches!(dataset.spatial, Some(Spatial::Wkt(_))));

        let mut stac_record = raw("Boxed");
        stac_record.spatial = Some(BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        let dataset = normalize(stac_record, &ProviderKind::StacApi.profile(), "eo-lake");
        assert!(matches!(dataset.spatial, Some(Spatial::GeoJson(_))));
    }
}
