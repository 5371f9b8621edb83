use super::{
    command::{format_query, metadata_query, ToolCommand},
    errors::MetadataFailure,
    formats::parse_formats,
    runner::{CapturedOutput, ToolRunner},
    types::{ContentDescriptor, FormatCandidate, ProviderFamily, Session, Shape},
};
use serde_json::Value;
use tracing::{debug, warn};

/// True when the link itself names a playlist (`?list=...`).
pub fn has_playlist_param(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| parsed.query_pairs().any(|(key, _)| key == "list"))
        .unwrap_or(false)
}

/// Build a descriptor from flat-playlist output. Only the first JSON record
/// is consulted; playlists print one record per entry.
pub fn parse_descriptor(stdout: &str, url: &str) -> anyhow::Result<ContentDescriptor> {
    let first_line = stdout.trim().lines().next().unwrap_or_default();
    let json: Value = serde_json::from_str(first_line)?;
    if !json.is_object() {
        anyhow::bail!("Expected a JSON object, got: {}", first_line);
    }

    let title = json["title"]
        .as_str()
        .unwrap_or("Unknown title")
        .to_string();
    let is_playlist = json["_type"].as_str() == Some("playlist") || has_playlist_param(url);

    Ok(ContentDescriptor {
        title,
        shape: if is_playlist {
            Shape::Playlist
        } else {
            Shape::SingleItem
        },
        family: ProviderFamily::YouTubeLike,
    })
}

async fn run_query(
    runner: &dyn ToolRunner,
    command: &ToolCommand,
) -> Result<CapturedOutput, MetadataFailure> {
    let output = runner
        .capture(command)
        .await
        .map_err(|e| MetadataFailure::Spawn {
            command: command.to_string(),
            reason: format!("{e:#}"),
        })?;

    if !output.success {
        warn!(
            "Metadata query failed with code {:?}: {}",
            output.code,
            output.stderr.trim()
        );
        return Err(MetadataFailure::NonZeroExit {
            command: command.to_string(),
            code: output.code,
            stderr: output.stderr,
        });
    }

    Ok(output)
}

/// Title and shape of a yt-dlp link.
pub async fn fetch_descriptor(
    runner: &dyn ToolRunner,
    session: &Session,
    url: &str,
) -> Result<ContentDescriptor, MetadataFailure> {
    let command = metadata_query(session, url);
    let output = run_query(runner, &command).await?;

    parse_descriptor(&output.stdout, url).map_err(|e| {
        warn!("Failed to parse metadata for {}: {}", url, e);
        MetadataFailure::Unparsable {
            command: command.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Every format yt-dlp reports for a single video.
pub async fn fetch_formats(
    runner: &dyn ToolRunner,
    session: &Session,
    url: &str,
) -> Result<Vec<FormatCandidate>, MetadataFailure> {
    let command = format_query(session, url);
    let output = run_query(runner, &command).await?;

    let formats = parse_formats(&output.stdout).map_err(|e| {
        warn!("Failed to parse formats for {}: {:#}", url, e);
        MetadataFailure::Unparsable {
            command: command.to_string(),
            reason: format!("{e:#}"),
        }
    })?;

    debug!("yt-dlp reported {} formats for {}", formats.len(), url);
    Ok(formats)
}
