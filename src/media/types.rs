use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    YouTubeLike,
    PublicBroadcaster,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    SingleItem,
    Playlist,
    /// Broadcaster links are always treated as possibly being part of a series.
    Series,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub title: String,
    pub shape: Shape,
    pub family: ProviderFamily,
}

/// One downloadable video encoding as reported by the full-format query.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatCandidate {
    pub format_id: String,
    pub width: u32,
    pub height: u32,
    /// As reported; rounded only for display.
    pub fps: f64,
    pub ext: String,
    pub has_audio: bool,
    pub has_video: bool,
    pub size: Option<u64>,
    pub bitrate: Option<f64>,
}

/// Browsers yt-dlp can borrow session cookies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieBrowser {
    Chrome,
    Firefox,
    Brave,
    Edge,
    Safari,
    Opera,
    Vivaldi,
    Chromium,
}

impl CookieBrowser {
    pub const ALL: [CookieBrowser; 8] = [
        CookieBrowser::Chrome,
        CookieBrowser::Firefox,
        CookieBrowser::Brave,
        CookieBrowser::Edge,
        CookieBrowser::Safari,
        CookieBrowser::Opera,
        CookieBrowser::Vivaldi,
        CookieBrowser::Chromium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CookieBrowser::Chrome => "chrome",
            CookieBrowser::Firefox => "firefox",
            CookieBrowser::Brave => "brave",
            CookieBrowser::Edge => "edge",
            CookieBrowser::Safari => "safari",
            CookieBrowser::Opera => "opera",
            CookieBrowser::Vivaldi => "vivaldi",
            CookieBrowser::Chromium => "chromium",
        }
    }
}

impl fmt::Display for CookieBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookieBrowser {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CookieBrowser::ALL
            .into_iter()
            .find(|browser| browser.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown cookie browser: {}", s))
    }
}

/// Per-process state that every yt-dlp invocation reads.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub cookie_browser: Option<CookieBrowser>,
}

impl Session {
    pub fn new(cookie_browser: Option<CookieBrowser>) -> Self {
        Self { cookie_browser }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoAction {
    StreamVideo,
    StreamAudio,
    DownloadVideo,
    DownloadAudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAction {
    StreamVideo,
    StreamAudio,
    DownloadVideo,
    DownloadAudio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesAction {
    DownloadBest,
    DownloadSeries,
    DownloadSeriesYtDlp,
    DownloadEpisodes,
    DownloadLastEpisodes,
    Stream,
    DownloadAudio,
}

/// What the user asked to do with a link. Each variant belongs to exactly
/// one (family, shape) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionChoice {
    Video(VideoAction),
    Playlist(PlaylistAction),
    Series(SeriesAction),
}

impl ActionChoice {
    /// The menu offered for a given family and shape, in display order.
    pub fn menu(family: ProviderFamily, shape: Shape) -> Vec<ActionChoice> {
        match (family, shape) {
            (ProviderFamily::PublicBroadcaster, _) | (_, Shape::Series) => vec![
                ActionChoice::Series(SeriesAction::DownloadBest),
                ActionChoice::Series(SeriesAction::DownloadSeries),
                ActionChoice::Series(SeriesAction::DownloadSeriesYtDlp),
                ActionChoice::Series(SeriesAction::DownloadEpisodes),
                ActionChoice::Series(SeriesAction::DownloadLastEpisodes),
                ActionChoice::Series(SeriesAction::Stream),
                ActionChoice::Series(SeriesAction::DownloadAudio),
            ],
            (_, Shape::Playlist) => vec![
                ActionChoice::Playlist(PlaylistAction::StreamVideo),
                ActionChoice::Playlist(PlaylistAction::StreamAudio),
                ActionChoice::Playlist(PlaylistAction::DownloadVideo),
                ActionChoice::Playlist(PlaylistAction::DownloadAudio),
            ],
            (_, Shape::SingleItem) => vec![
                ActionChoice::Video(VideoAction::StreamVideo),
                ActionChoice::Video(VideoAction::StreamAudio),
                ActionChoice::Video(VideoAction::DownloadVideo),
                ActionChoice::Video(VideoAction::DownloadAudio),
            ],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionChoice::Video(VideoAction::StreamVideo) => "Stream Video (MPV)",
            ActionChoice::Video(VideoAction::StreamAudio) => "Stream Audio (MPV)",
            ActionChoice::Video(VideoAction::DownloadVideo) => "Download video",
            ActionChoice::Video(VideoAction::DownloadAudio) => "Download audio",
            ActionChoice::Playlist(PlaylistAction::StreamVideo) => "Stream Full Playlist (Video)",
            ActionChoice::Playlist(PlaylistAction::StreamAudio) => "Stream Full Playlist (Audio)",
            ActionChoice::Playlist(PlaylistAction::DownloadVideo) => {
                "Download Full Playlist (Video)"
            }
            ActionChoice::Playlist(PlaylistAction::DownloadAudio) => {
                "Download Full Playlist (Audio)"
            }
            ActionChoice::Series(SeriesAction::DownloadBest) => {
                "Download (Best quality + Subtitles)"
            }
            ActionChoice::Series(SeriesAction::DownloadSeries) => "Download Whole Series (-A)",
            ActionChoice::Series(SeriesAction::DownloadSeriesYtDlp) => {
                "Download Whole Series (yt-dlp)"
            }
            ActionChoice::Series(SeriesAction::DownloadEpisodes) => {
                "Download Specific Episodes (yt-dlp)"
            }
            ActionChoice::Series(SeriesAction::DownloadLastEpisodes) => {
                "Download the LAST X episodes (svtplay-dl)"
            }
            ActionChoice::Series(SeriesAction::Stream) => "Stream (MPV)",
            ActionChoice::Series(SeriesAction::DownloadAudio) => "Download audio only",
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(
            self,
            ActionChoice::Video(VideoAction::StreamVideo | VideoAction::StreamAudio)
                | ActionChoice::Playlist(PlaylistAction::StreamVideo | PlaylistAction::StreamAudio)
                | ActionChoice::Series(SeriesAction::Stream)
        )
    }
}

/// Parameters some actions need on top of the link itself.
#[derive(Debug, Clone, Default)]
pub struct ActionParams {
    pub format: Option<FormatCandidate>,
    pub episodes: Option<String>,
    pub count: Option<String>,
}

/// Fixed for a whole batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DownloadMode {
    Video,
    Audio,
}

/// What the previous dispatch cycle did; decides clipboard pre-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastAction {
    Stream,
    Download,
    #[default]
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_browser_from_str() {
        assert_eq!(
            "Firefox".parse::<CookieBrowser>().unwrap(),
            CookieBrowser::Firefox
        );
        assert_eq!(
            " chromium ".parse::<CookieBrowser>().unwrap(),
            CookieBrowser::Chromium
        );
        assert!("netscape".parse::<CookieBrowser>().is_err());
    }

    #[test]
    fn test_menu_matches_family_and_shape() {
        let single = ActionChoice::menu(ProviderFamily::YouTubeLike, Shape::SingleItem);
        assert_eq!(single.len(), 4);
        assert!(single
            .iter()
            .all(|a| matches!(a, ActionChoice::Video(_))));

        let playlist = ActionChoice::menu(ProviderFamily::YouTubeLike, Shape::Playlist);
        assert!(playlist
            .iter()
            .all(|a| matches!(a, ActionChoice::Playlist(_))));

        let series = ActionChoice::menu(ProviderFamily::PublicBroadcaster, Shape::Series);
        assert_eq!(series.len(), 7);
        assert!(series.contains(&ActionChoice::Series(SeriesAction::DownloadLastEpisodes)));
    }

    #[test]
    fn test_is_stream() {
        assert!(ActionChoice::Video(VideoAction::StreamAudio).is_stream());
        assert!(ActionChoice::Series(SeriesAction::Stream).is_stream());
        assert!(!ActionChoice::Playlist(PlaylistAction::DownloadAudio).is_stream());
    }
}
