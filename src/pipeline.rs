//! The reporting run: fetch, join, aggregate, print

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::info;

use regscope_cluster::{ClusterClient, CommandRunner, resolve_registry};
use regscope_usage::{ImageIndex, Report, ReportWriter, UsageAggregator};

/// Report format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Progress lines, ranked table and total
    #[default]
    Text,
    /// One JSON document at the end of the run
    Json,
}

/// Compute usage for every project and write the report to `out`.
///
/// `registry` overrides discovery from the registry service. Without it a
/// failed discovery falls back to the default registry address.
pub async fn run<R, W>(
    client: &ClusterClient<R>,
    registry: Option<String>,
    format: OutputFormat,
    mut out: W,
) -> Result<Report>
where
    R: CommandRunner,
    W: Write,
{
    // Session and registry
    let identity = client
        .current_identity()
        .await
        .context("Failed to read the current oc session. Are you logged in?")?;

    let registry = match registry {
        Some(registry) => registry,
        None => resolve_registry(client).await,
    };

    // JSON output replaces the progress lines with one document at the end
    let progress: Box<dyn Write + '_> = match format {
        OutputFormat::Text => Box::new(&mut out),
        OutputFormat::Json => Box::new(io::sink()),
    };
    let mut writer = ReportWriter::new(progress);
    writer.identity(&identity)?;

    // Cluster-wide listings
    writer.fetching("projects")?;
    let projects = client.projects().await.context("Failed to list projects")?;
    writer.found(projects.len(), "projects")?;

    writer.fetching("images")?;
    let index = ImageIndex::new(client.images().await.context("Failed to list images")?);
    writer.found(index.len(), "images")?;

    let aggregator = UsageAggregator::new(&index, registry.as_str());
    info!(
        registry = aggregator.registry(),
        refresh = client.refresh(),
        "computing registry usage"
    );
    let mut report = Report::new(identity, registry.as_str());

    // One image stream listing per project
    for project in &projects {
        let name = project.name();
        writer.processing(name)?;

        let streams = client
            .image_streams(name)
            .await
            .with_context(|| format!("Failed to list image streams in {}", name))?;

        let usage = aggregator.project_usage(name, &streams);
        writer.project(&usage)?;
        report.push(usage);
    }

    // Ranking and total
    writer.summary(&report)?;
    drop(writer);

    if format == OutputFormat::Json {
        writeln!(out, "{}", report.to_json()?)?;
    }

    Ok(report)
}
