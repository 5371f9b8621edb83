use super::{
    errors::ValidationFailure,
    types::{
        ActionChoice, ActionParams, DownloadMode, PlaylistAction, ProviderFamily, SeriesAction,
        Session, VideoAction,
    },
};
use std::fmt;
use std::path::{Path, PathBuf};

pub const SINGLE_AUDIO_TEMPLATE: &str = "%(title)s.%(ext)s";
pub const SINGLE_VIDEO_TEMPLATE: &str = "%(title)s-%(height)sp.%(ext)s";
pub const PLAYLIST_TEMPLATE: &str = "%(playlist)s/%(playlist_index)02d - %(title)s.%(ext)s";
pub const SERIES_TEMPLATE: &str =
    "%(series)s/S%(season_number)02dE%(episode_number)02d - %(title)s.%(ext)s";

const BATCH_TEMPLATE: &str = "%(title)s.%(ext)s";
const MP4_VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";
const AUDIO_FORMAT: &str = "bestaudio/best";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    YtDlp,
    SvtplayDl,
    Mpv,
}

impl Tool {
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::YtDlp => "yt-dlp",
            Tool::SvtplayDl => "svtplay-dl",
            Tool::Mpv => "mpv",
        }
    }
}

/// A fully-formed external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub tool: Tool,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_path_buf());
        self
    }

    /// Program name followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.tool.binary().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

fn with_cookies(command: ToolCommand, session: &Session) -> ToolCommand {
    match session.cookie_browser {
        Some(browser) => command.args(["--cookies-from-browser", browser.as_str()]),
        None => command,
    }
}

/// Flags shared by every yt-dlp download.
pub fn ytdlp_base(session: &Session) -> ToolCommand {
    let command = ToolCommand::new(Tool::YtDlp).args([
        "--no-warnings",
        "--force-overwrites",
        "--embed-metadata",
        "--embed-thumbnail",
    ]);
    with_cookies(command, session)
}

/// Flat-playlist metadata dump; one JSON object per line.
pub fn metadata_query(session: &Session, url: &str) -> ToolCommand {
    let command = ToolCommand::new(Tool::YtDlp).args([
        "--flat-playlist",
        "--dump-json",
        "--no-warnings",
    ]);
    with_cookies(command, session).arg(url)
}

/// Full single-object dump including the `formats` array.
pub fn format_query(session: &Session, url: &str) -> ToolCommand {
    with_cookies(ToolCommand::new(Tool::YtDlp).arg("-J"), session).arg(url)
}

fn stream(url: &str, audio_only: bool) -> ToolCommand {
    let flag = if audio_only { "--no-video" } else { "--no-terminal" };
    ToolCommand::new(Tool::Mpv).args([flag, url])
}

fn audio_download(session: &Session, template: &str, url: &str) -> ToolCommand {
    ytdlp_base(session)
        .args(["-f", AUDIO_FORMAT, "-x", "--audio-format", "opus", "-o", template])
        .arg(url)
}

fn series_download(session: &Session, episodes: Option<&str>, url: &str) -> ToolCommand {
    let command = ytdlp_base(session).args([
        "--embed-subs",
        "--write-subs",
        "--sub-langs",
        "all",
    ]);
    let command = match episodes {
        Some(items) => command.args(["--playlist-items", items]),
        None => command,
    };
    command.args(["-o", SERIES_TEMPLATE]).arg(url)
}

fn is_count(count: &str) -> bool {
    !count.is_empty() && count.chars().all(|c| c.is_ascii_digit())
}

/// Turn an action on `url` into the exact external invocation.
pub fn build(
    session: &Session,
    action: ActionChoice,
    params: &ActionParams,
    url: &str,
) -> Result<ToolCommand, ValidationFailure> {
    let command = match action {
        ActionChoice::Video(VideoAction::StreamVideo)
        | ActionChoice::Playlist(PlaylistAction::StreamVideo)
        | ActionChoice::Series(SeriesAction::Stream) => stream(url, false),
        ActionChoice::Video(VideoAction::StreamAudio)
        | ActionChoice::Playlist(PlaylistAction::StreamAudio) => stream(url, true),

        ActionChoice::Video(VideoAction::DownloadVideo) => {
            let format = params
                .format
                .as_ref()
                .ok_or(ValidationFailure::MissingFormat)?;
            let selector = if format.has_audio {
                format.format_id.clone()
            } else {
                format!("{}+bestaudio", format.format_id)
            };
            ytdlp_base(session)
                .args(["-f".to_string(), selector])
                .args([
                    "--merge-output-format",
                    "mp4",
                    "-o",
                    SINGLE_VIDEO_TEMPLATE,
                ])
                .arg(url)
        }
        ActionChoice::Video(VideoAction::DownloadAudio) => {
            audio_download(session, SINGLE_AUDIO_TEMPLATE, url)
        }

        ActionChoice::Playlist(PlaylistAction::DownloadVideo) => ytdlp_base(session)
            .args([
                "-f",
                MP4_VIDEO_FORMAT,
                "--merge-output-format",
                "mp4",
                "-o",
                PLAYLIST_TEMPLATE,
            ])
            .arg(url),
        ActionChoice::Playlist(PlaylistAction::DownloadAudio) => {
            audio_download(session, PLAYLIST_TEMPLATE, url)
        }

        ActionChoice::Series(SeriesAction::DownloadBest) => {
            ToolCommand::new(Tool::SvtplayDl).args(["-S", "-M", url])
        }
        ActionChoice::Series(SeriesAction::DownloadSeries) => {
            ToolCommand::new(Tool::SvtplayDl).args(["-S", "-M", "-A", url])
        }
        ActionChoice::Series(SeriesAction::DownloadSeriesYtDlp) => {
            series_download(session, None, url)
        }
        ActionChoice::Series(SeriesAction::DownloadEpisodes) => {
            let items = params
                .episodes
                .as_deref()
                .map(str::trim)
                .filter(|items| !items.is_empty())
                .ok_or(ValidationFailure::EmptyEpisodeRange)?;
            series_download(session, Some(items), url)
        }
        ActionChoice::Series(SeriesAction::DownloadLastEpisodes) => {
            let count = params.count.as_deref().unwrap_or_default();
            if !is_count(count) {
                return Err(ValidationFailure::InvalidEpisodeCount(count.to_string()));
            }
            ToolCommand::new(Tool::SvtplayDl).args(["-S", "-M", "-A", "--all-last", count, url])
        }
        ActionChoice::Series(SeriesAction::DownloadAudio) => {
            ToolCommand::new(Tool::SvtplayDl).args(["--only-audio", url])
        }
    };

    Ok(command)
}

/// Non-interactive download used by batch runs. Returns `None` for links
/// no tool handles.
pub fn build_silent(
    session: &Session,
    family: ProviderFamily,
    mode: DownloadMode,
    url: &str,
    output_dir: &Path,
) -> Option<ToolCommand> {
    match family {
        ProviderFamily::YouTubeLike => {
            let command = ytdlp_base(session)
                .arg("-P")
                .arg(output_dir.to_string_lossy());
            let command = match mode {
                DownloadMode::Video => command.args([
                    "-f",
                    MP4_VIDEO_FORMAT,
                    "--merge-output-format",
                    "mp4",
                    "-o",
                    BATCH_TEMPLATE,
                ]),
                DownloadMode::Audio => command.args([
                    "-f",
                    AUDIO_FORMAT,
                    "-x",
                    "--audio-format",
                    "opus",
                    "-o",
                    BATCH_TEMPLATE,
                ]),
            };
            Some(command.arg(url))
        }
        ProviderFamily::PublicBroadcaster => {
            let command = ToolCommand::new(Tool::SvtplayDl).args(["-S", "-M"]);
            let command = match mode {
                DownloadMode::Video => command,
                DownloadMode::Audio => command.arg("--only-audio"),
            };
            Some(command.arg(url).current_dir(output_dir))
        }
        ProviderFamily::Unsupported => None,
    }
}
