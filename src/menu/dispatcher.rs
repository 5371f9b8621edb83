use super::ui::{Tone, Ui};
use crate::history::HistoryStore;
use crate::media::{
    build, describe, dispatch_family, fetch_descriptor, fetch_formats, reduce, ActionChoice,
    ActionParams, ContentDescriptor, LastAction, MetadataFailure, ProviderFamily, SeriesAction,
    Session, Shape, ToolCommand, ToolRunner, ValidationFailure, VideoAction,
};
use crate::utils::header_title;
use anyhow::Result;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    Cancelled,
    Invalid(ValidationFailure),
    MetadataFailed(MetadataFailure),
}

/// Result of one dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub outcome: Outcome,
    pub last_action: LastAction,
}

impl Report {
    fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            last_action: LastAction::None,
        }
    }

    fn cancelled() -> Self {
        Self::new(Outcome::Cancelled)
    }
}

/// Either keep going with a value or stop the cycle with a report.
enum Step<T> {
    Next(T),
    Done(Report),
}

/// Takes one link from classification through to a reported outcome.
pub struct Dispatcher<'a> {
    session: &'a Session,
    runner: &'a dyn ToolRunner,
    history: &'a HistoryStore,
    ui: &'a dyn Ui,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        session: &'a Session,
        runner: &'a dyn ToolRunner,
        history: &'a HistoryStore,
        ui: &'a dyn Ui,
    ) -> Self {
        Self {
            session,
            runner,
            history,
            ui,
        }
    }

    pub async fn dispatch(&self, url: &str) -> Result<Report> {
        info!("Dispatching {}", url);

        let descriptor = match self.describe_link(url).await {
            Step::Next(descriptor) => descriptor,
            Step::Done(report) => return Ok(report),
        };

        let actions = ActionChoice::menu(descriptor.family, descriptor.shape);
        let labels: Vec<String> = actions.iter().map(|a| a.label().to_string()).collect();
        let Some(action) = self
            .ui
            .choose(&menu_header(&descriptor), &labels)?
            .and_then(|index| actions.get(index).copied())
        else {
            return Ok(Report::cancelled());
        };
        info!("Selected action: {}", action.label());

        let params = match self.collect_params(action, url).await? {
            Step::Next(params) => params,
            Step::Done(report) => return Ok(report),
        };

        let command = match build(self.session, action, &params, url) {
            Ok(command) => command,
            Err(failure) => {
                self.ui.notice(Tone::Error, &failure.to_string());
                return Ok(Report::new(Outcome::Invalid(failure)));
            }
        };

        Ok(self.execute(action, &command).await)
    }

    async fn describe_link(&self, url: &str) -> Step<ContentDescriptor> {
        match dispatch_family(url) {
            // No metadata round-trip for the broadcaster; the link is its own title.
            ProviderFamily::PublicBroadcaster => {
                self.history.add(url, url);
                Step::Next(ContentDescriptor {
                    title: url.to_string(),
                    shape: Shape::Series,
                    family: ProviderFamily::PublicBroadcaster,
                })
            }
            _ => match fetch_descriptor(self.runner, self.session, url).await {
                Ok(descriptor) => {
                    self.history.add(&descriptor.title, url);
                    Step::Next(descriptor)
                }
                Err(failure) => Step::Done(self.metadata_failed(failure)),
            },
        }
    }

    async fn collect_params(&self, action: ActionChoice, url: &str) -> Result<Step<ActionParams>> {
        let mut params = ActionParams::default();

        match action {
            ActionChoice::Video(VideoAction::DownloadVideo) => {
                let formats = match fetch_formats(self.runner, self.session, url).await {
                    Ok(formats) => reduce(formats),
                    Err(failure) => return Ok(Step::Done(self.metadata_failed(failure))),
                };

                if formats.is_empty() {
                    self.ui
                        .notice(Tone::Error, "No downloadable video formats were found.");
                    return Ok(Step::Done(Report::new(Outcome::Failed)));
                }

                let rows: Vec<String> = formats.iter().map(describe).collect();
                let header = "Select Quality (ID | Resolution | FPS | Type | Audio | Size)";
                match self.ui.choose(header, &rows)? {
                    Some(index) => params.format = formats.into_iter().nth(index),
                    None => return Ok(Step::Done(Report::cancelled())),
                }
                if params.format.is_none() {
                    return Ok(Step::Done(Report::cancelled()));
                }
            }
            ActionChoice::Series(SeriesAction::DownloadEpisodes) => {
                match self.ui.input("Enter episodes (e.g. 1, 2-5, 10)...", "")? {
                    Some(items) => params.episodes = Some(items),
                    None => return Ok(Step::Done(Report::cancelled())),
                }
            }
            ActionChoice::Series(SeriesAction::DownloadLastEpisodes) => {
                match self
                    .ui
                    .input("Number of episodes from the end (e.g. 5)...", "")?
                {
                    Some(count) => params.count = Some(count),
                    None => return Ok(Step::Done(Report::cancelled())),
                }
            }
            _ => {}
        }

        Ok(Step::Next(params))
    }

    async fn execute(&self, action: ActionChoice, command: &ToolCommand) -> Report {
        if action.is_stream() {
            let outcome = match self.runner.run(command).await {
                Ok(true) => Outcome::Succeeded,
                Ok(false) => Outcome::Failed,
                Err(e) => {
                    error!("Stream failed to start: {:#}", e);
                    self.ui
                        .notice(Tone::Error, &format!("Could not start player: {e}"));
                    Outcome::Failed
                }
            };
            return Report {
                outcome,
                last_action: LastAction::Stream,
            };
        }

        self.ui
            .notice(Tone::Info, &format!("Starting: {}...", action.label()));

        let success = match self.runner.run(command).await {
            Ok(success) => success,
            Err(e) => {
                error!("Download failed to start: {:#}", e);
                false
            }
        };

        let outcome = if success {
            self.ui.notice(Tone::Success, "Download complete.");
            Outcome::Succeeded
        } else {
            self.ui.notice(Tone::Error, "Download failed.");
            Outcome::Failed
        };

        Report {
            outcome,
            last_action: LastAction::Download,
        }
    }

    fn metadata_failed(&self, failure: MetadataFailure) -> Report {
        self.ui.notice(Tone::Error, &failure.to_string());

        let mut debug_info = format!("\n--- DEBUG INFO ---\nCommand: {}", failure.command());
        match &failure {
            MetadataFailure::NonZeroExit { code, stderr, .. } => {
                let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                debug_info.push_str(&format!("\nReturn code: {}\nError output:\n{}", code, stderr));
            }
            MetadataFailure::Spawn { reason, .. } | MetadataFailure::Unparsable { reason, .. } => {
                debug_info.push_str(&format!("\nReason: {}", reason));
            }
        }
        debug_info.push_str("\n------------------\n");
        self.ui.notice(Tone::Info, &debug_info);

        if matches!(failure, MetadataFailure::NonZeroExit { .. })
            && self.session.cookie_browser.is_none()
        {
            self.ui.notice(
                Tone::Hint,
                "Tip: Try selecting a browser for cookies in the main menu.",
            );
        }

        Report::new(Outcome::MetadataFailed(failure))
    }
}

fn menu_header(descriptor: &ContentDescriptor) -> String {
    match descriptor.shape {
        Shape::Series => "SVT Play link detected.\nWhat do you want to do?".to_string(),
        Shape::Playlist => format!(
            "What do you want to do with the playlist:\n{}?",
            header_title(&descriptor.title)
        ),
        Shape::SingleItem => format!(
            "What do you want to do with:\n{}?",
            header_title(&descriptor.title)
        ),
    }
}
