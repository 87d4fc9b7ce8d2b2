use anyhow::Context;
use quarry_catalog::CatalogClient;
use quarry_harvest::Ingestor;
use serde_json::Value;
use tracing::info;

use crate::config::{HarvesterSettings, SourceConfig};

/// Runs one harvesting batch to completion.
///
/// Per-record failures are logged and absorbed inside the batch; the run
/// itself only fails on configuration or source-loading problems.
pub async fn run(settings: HarvesterSettings) -> anyhow::Result<()> {
    info!(
        organization = settings.organization,
        "starting harvester run"
    );

    let records = load_records(&settings.source).await?;
    info!(records = records.len(), "source records loaded");

    let client = CatalogClient::new(&settings.catalog)?;
    let ingestor = Ingestor::new(client, settings.provider, settings.organization);

    let summary = ingestor.ingest_batch(&records).await;
    info!(
        published = summary.published.len(),
        skipped = summary.skipped,
        failed = summary.failed,
        "harvester run completed"
    );

    Ok(())
}

/// Reads the source document once and extracts its record array.
///
/// STAC API endpoints wrap the records in a `collections` envelope; file
/// dumps are plain arrays.
async fn load_records(source: &SourceConfig) -> anyhow::Result<Vec<Value>> {
    let raw = match source {
        SourceConfig::File { path } => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source file {path}"))?,
        SourceConfig::Url { url } => reqwest::get(url)
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("failed to fetch source document {url}"))?
            .text()
            .await?,
    };

    let document: Value =
        serde_json::from_str(&raw).context("source document is not valid JSON")?;

    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut envelope) => match envelope.remove("collections") {
            Some(Value::Array(records)) => records,
            _ => anyhow::bail!("source document carries no record array"),
        },
        _ => anyhow::bail!("source document carries no record array"),
    };

    Ok(records)
}
