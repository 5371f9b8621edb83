use super::types::ProviderFamily;
use regex::Regex;
use std::sync::LazyLock;

pub const BROADCASTER_DOMAIN: &str = "svtplay.se";

static YOUTUBE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^https?://(www\.)?youtube\.com/").unwrap(),
        Regex::new(r"^https?://(www\.)?youtu\.be/").unwrap(),
    ]
});

static BROADCASTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.)?svtplay\.se/").unwrap());

/// Decide which provider family a link belongs to. Matching is anchored at
/// the start of `text`, so callers must trim first.
pub fn classify(text: &str) -> ProviderFamily {
    if YOUTUBE_PATTERNS.iter().any(|re| re.is_match(text)) {
        ProviderFamily::YouTubeLike
    } else if BROADCASTER_PATTERN.is_match(text) {
        ProviderFamily::PublicBroadcaster
    } else {
        ProviderFamily::Unsupported
    }
}

pub fn is_supported(text: &str) -> bool {
    classify(text) != ProviderFamily::Unsupported
}

/// Family used when dispatching a link the user typed. Anything that is not
/// a broadcaster link goes down the yt-dlp path and fails there if unusable.
pub fn dispatch_family(url: &str) -> ProviderFamily {
    if url.contains(BROADCASTER_DOMAIN) {
        ProviderFamily::PublicBroadcaster
    } else {
        ProviderFamily::YouTubeLike
    }
}
