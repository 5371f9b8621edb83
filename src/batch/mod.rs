use crate::media::{
    build_silent, classify, DownloadMode, Session, ToolRunner, ValidationFailure,
};
use crate::menu::ui::{Tone, Ui};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Comment,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Skipped(SkipReason),
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineResult {
    /// 1-based line number in the link file
    pub line: usize,
    pub text: String,
    pub status: LineStatus,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub results: Vec<LineResult>,
}

impl BatchReport {
    fn count(&self, matches: impl Fn(&LineStatus) -> bool) -> usize {
        self.results.iter().filter(|r| matches(&r.status)).count()
    }

    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, LineStatus::Succeeded | LineStatus::Failed))
    }

    pub fn succeeded(&self) -> usize {
        self.count(|s| *s == LineStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(|s| *s == LineStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, LineStatus::Skipped(_)))
    }
}

fn skip_reason(line: &str) -> Option<SkipReason> {
    if line.is_empty() {
        Some(SkipReason::Blank)
    } else if line.starts_with('#') {
        Some(SkipReason::Comment)
    } else {
        None
    }
}

/// Downloads land in a sibling directory named after the link file.
pub fn output_dir_for(path: &Path) -> Result<PathBuf> {
    let absolute = path
        .canonicalize()
        .with_context(|| format!("Could not resolve {}", path.display()))?;
    let stem = absolute
        .file_stem()
        .context("Link file has no name")?;
    let parent = absolute.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(stem))
}

pub fn choose_mode(ui: &dyn Ui) -> Result<Option<DownloadMode>> {
    let items = vec![
        "Video (Best Quality)".to_string(),
        "Audio (Opus)".to_string(),
    ];
    Ok(ui
        .choose("Download mode for all links?", &items)?
        .map(|index| {
            if index == 0 {
                DownloadMode::Video
            } else {
                DownloadMode::Audio
            }
        }))
}

/// Download every supported link in `path`, one at a time, in file order.
/// Individual failures never stop the batch.
pub async fn run_batch(
    path: &Path,
    mode: DownloadMode,
    session: &Session,
    runner: &dyn ToolRunner,
    ui: &dyn Ui,
) -> Result<BatchReport> {
    if path.as_os_str().is_empty() || !path.is_file() {
        return Err(ValidationFailure::MissingBatchFile(path.display().to_string()).into());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Error reading file {}", path.display()))?;

    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .collect();
    let total = lines
        .iter()
        .filter(|(_, line)| skip_reason(line).is_none())
        .count();

    if total == 0 {
        return Err(ValidationFailure::EmptyBatchFile(path.display().to_string()).into());
    }

    let output_dir = output_dir_for(path)?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Could not create directory {}", output_dir.display()))?;

    ui.notice(Tone::Info, &format!("Output directory: {}", output_dir.display()));
    ui.notice(
        Tone::Info,
        &format!("Found {} links. Starting batch download...", total),
    );
    info!(
        "Batch of {} links from {} into {} ({:?})",
        total,
        path.display(),
        output_dir.display(),
        mode
    );

    let mut results = Vec::with_capacity(lines.len());
    let mut index = 0;

    for (line, text) in lines {
        let status = match skip_reason(text) {
            Some(reason) => LineStatus::Skipped(reason),
            None => {
                index += 1;
                process_line(text, index, total, mode, &output_dir, session, runner, ui).await
            }
        };

        results.push(LineResult {
            line,
            text: text.to_string(),
            status,
        });
    }

    let report = BatchReport {
        output_dir,
        results,
    };

    ui.notice(
        Tone::Success,
        &format!(
            "Batch processing complete! {} processed ({} failed), {} skipped.",
            report.processed(),
            report.failed(),
            report.skipped()
        ),
    );
    ui.notice(
        Tone::Info,
        &format!("Files saved to: {}", report.output_dir.display()),
    );
    info!(
        "Batch finished: {} succeeded, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped()
    );

    Ok(report)
}

#[allow(clippy::too_many_arguments)]
async fn process_line(
    url: &str,
    index: usize,
    total: usize,
    mode: DownloadMode,
    output_dir: &Path,
    session: &Session,
    runner: &dyn ToolRunner,
    ui: &dyn Ui,
) -> LineStatus {
    let command = match build_silent(session, classify(url), mode, url, output_dir) {
        Some(command) => command,
        None => {
            ui.notice(
                Tone::Hint,
                &format!("[{}/{}] Skipping invalid link: {}", index, total, url),
            );
            return LineStatus::Skipped(SkipReason::Unsupported);
        }
    };

    ui.notice(
        Tone::Info,
        &format!("[{}/{}] Processing: {}", index, total, url),
    );

    match runner.run(&command).await {
        Ok(true) => {
            ui.notice(Tone::Success, "Done");
            LineStatus::Succeeded
        }
        Ok(false) => {
            ui.notice(Tone::Error, "Failed");
            LineStatus::Failed
        }
        Err(e) => {
            error!("Could not run {}: {:#}", command, e);
            ui.notice(Tone::Error, &format!("Failed: {e}"));
            LineStatus::Failed
        }
    }
}
