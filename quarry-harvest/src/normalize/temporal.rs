use serde_json::Value;

use crate::error::{HarvestError, HarvestResult};

/// Marker some providers use for an unbounded interval end.
const OPEN_END: &str = "..";

/// Temporal coverage of a dataset; either bound may be absent.
pub type TemporalExtent = (Option<String>, Option<String>);

/// Parses a `start/end` delimited temporal coverage string.
///
/// `..` on either side denotes an unbounded end. Absent or blank input
/// yields two absent bounds; a string without the `/` delimiter is a data
/// error for the record, never coerced into a default date.
pub fn parse_delimited(value: Option<&str>) -> HarvestResult<TemporalExtent> {
    let Some(coverage) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok((None, None));
    };

    let Some((start, end)) = coverage.split_once('/') else {
        return Err(HarvestError::malformed(
            "temporalCoverage",
            format!("expected `start/end`, got `{coverage}`"),
        ));
    };

    Ok((parse_bound(start), parse_bound(end)))
}

fn parse_bound(raw: &str) -> Option<String> {
    let bound = raw.trim();
    (!bound.is_empty() && bound != OPEN_END).then(|| bound.to_owned())
}

/// Parses a structured temporal coverage of the form
/// `{"interval": [[start, end], ...]}` where either element may be null.
///
/// Only the first interval is considered. A null or absent coverage yields
/// two absent bounds; a coverage without a well-formed interval list is a
/// data error for the record.
pub fn parse_interval_list(value: &Value) -> HarvestResult<TemporalExtent> {
    if value.is_null() {
        return Ok((None, None));
    }

    let interval = value
        .get("interval")
        .ok_or_else(|| HarvestError::malformed("temporal", "missing `interval` list"))?;

    let intervals = match interval {
        Value::Null => return Ok((None, None)),
        Value::Array(intervals) => intervals,
        other => {
            return Err(HarvestError::malformed(
                "temporal",
                format!("`interval` is not a list: {other}"),
            ));
        }
    };

    let Some(first) = intervals.first() else {
        return Ok((None, None));
    };

    let timespan = first.as_array().ok_or_else(|| {
        HarvestError::malformed("temporal", format!("interval entry is not a pair: {first}"))
    })?;
    if timespan.len() != 2 {
        return Err(HarvestError::malformed(
            "temporal",
            format!("interval entry has {} elements, expected 2", timespan.len()),
        ));
    }

    Ok((interval_bound(&timespan[0])?, interval_bound(&timespan[1])?))
}

fn interval_bound(value: &Value) -> HarvestResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(bound) => Ok(Some(bound.clone())),
        other => Err(HarvestError::malformed(
            "temporal",
            format!("interval bound is neither a string nor null: {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delimited_open_end_yields_absent_bound() {
        assert_eq!(
            parse_delimited(Some("2015-04-24/..")).unwrap(),
            (Some("2015-04-24".to_owned()), None)
        );
    }

    #[test]
    fn delimited_closed_interval_yields_both_bounds() {
        assert_eq!(
            parse_delimited(Some("2015-04-24/2020-07-12")).unwrap(),
            (
                Some("2015-04-24".to_owned()),
                Some("2020-07-12".to_owned())
            )
        );
    }

    #[test]
    fn absent_coverage_yields_absent_bounds() {
        assert_eq!(parse_delimited(None).unwrap(), (None, None));
        assert_eq!(parse_delimited(Some("  ")).unwrap(), (None, None));
    }

    #[test]
    fn delimited_without_separator_is_an_error() {
        assert!(matches!(
            parse_delimited(Some("2015-04-24")),
            Err(HarvestError::MalformedField { field: "temporalCoverage", .. })
        ));
    }

    #[test]
    fn interval_list_takes_the_first_interval() {
        let coverage = json!({
            "interval": [["2015-06-23T00:00:00Z", null], ["2016-01-01", "2017-01-01"]],
        });
        assert_eq!(
            parse_interval_list(&coverage).unwrap(),
            (Some("2015-06-23T00:00:00Z".to_owned()), None)
        );
    }

    #[test]
    fn null_or_empty_interval_list_yields_absent_bounds() {
        assert_eq!(parse_interval_list(&Value::Null).unwrap(), (None, None));
        assert_eq!(
            parse_interval_list(&json!({ "interval": null })).unwrap(),
            (None, None)
        );
        assert_eq!(
            parse_interval_list(&json!({ "interval": [] })).unwrap(),
            (None, None)
        );
    }

    #[test]
    fn malformed_interval_entries_are_errors() {
        assert!(parse_interval_list(&json!({})).is_err());
        assert!(parse_interval_list(&json!({ "interval": "2015/2016" })).is_err());
        assert!(parse_interval_list(&json!({ "interval": [["2015"]] })).is_err());
        assert!(parse_interval_list(&json!({ "interval": [[2015, 2016]] })).is_err());
    }
}
