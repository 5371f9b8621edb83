use super::types::FormatCandidate;
use crate::utils::format_mib;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::cmp::Ordering;

#[derive(Debug, Deserialize)]
struct FullInfo {
    #[serde(default)]
    formats: Vec<RawFormat>,
}

/// A single entry of yt-dlp's `formats` array. Numeric fields come through
/// as floats or nulls depending on the extractor.
#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    fps: Option<f64>,
    ext: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
    tbr: Option<f64>,
    vbr: Option<f64>,
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

impl From<RawFormat> for FormatCandidate {
    fn from(raw: RawFormat) -> Self {
        FormatCandidate {
            format_id: raw.format_id.unwrap_or_else(|| "N/A".to_string()),
            width: positive(raw.width).map(|w| w as u32).unwrap_or(0),
            height: positive(raw.height).map(|h| h as u32).unwrap_or(0),
            fps: positive(raw.fps).unwrap_or(0.0),
            ext: raw.ext.unwrap_or_else(|| "N/A".to_string()),
            has_audio: raw.acodec.as_deref().is_some_and(|a| a != "none"),
            has_video: raw.vcodec.as_deref() != Some("none"),
            size: positive(raw.filesize)
                .or(positive(raw.filesize_approx))
                .map(|s| s as u64),
            bitrate: positive(raw.tbr).or(positive(raw.vbr)),
        }
    }
}

/// Parse the single JSON object printed by `yt-dlp -J` into format rows.
pub fn parse_formats(json: &str) -> Result<Vec<FormatCandidate>> {
    let info: FullInfo = serde_json::from_str(json).context("Failed to parse format listing")?;
    Ok(info.formats.into_iter().map(FormatCandidate::from).collect())
}

/// True when `candidate` should replace `existing` as the representative
/// of their shared height.
fn is_better(candidate: &FormatCandidate, existing: &FormatCandidate) -> bool {
    match candidate.fps.partial_cmp(&existing.fps) {
        Some(Ordering::Greater) => return true,
        Some(Ordering::Less) => return false,
        _ => {}
    }

    match (candidate.size, existing.size, candidate.bitrate, existing.bitrate) {
        (Some(new), Some(old), _, _) => new > old,
        (_, _, Some(new), Some(old)) => new > old,
        (Some(_), None, _, _) => true,
        (_, _, Some(_), None) => true,
        _ => false,
    }
}

/// Collapse a raw format list to one best video row per height, highest
/// resolution first. Audio-only and zero-height rows are dropped.
pub fn reduce(raw: Vec<FormatCandidate>) -> Vec<FormatCandidate> {
    let mut best: Vec<FormatCandidate> = Vec::new();

    for candidate in raw {
        if !candidate.has_video || candidate.height == 0 {
            continue;
        }

        match best.iter_mut().find(|f| f.height == candidate.height) {
            Some(existing) => {
                if is_better(&candidate, existing) {
                    *existing = candidate;
                }
            }
            None => best.push(candidate),
        }
    }

    best.sort_by(|a, b| b.height.cmp(&a.height));
    best
}

/// Menu row for the quality picker.
pub fn describe(format: &FormatCandidate) -> String {
    let resolution = format!("{}x{}", format.width, format.height);
    let audio = if format.has_audio { "YES" } else { "NO " };
    let size = format
        .size
        .map(format_mib)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "{:<5} | {:<9} | {:<4} | {:<4} | audio:{} | {}",
        format.format_id,
        resolution,
        format.fps.round() as u32,
        format.ext,
        audio,
        size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn row(id: &str, height: u32, fps: u32, size: Option<u64>, bitrate: Option<f64>) -> FormatCandidate {
        FormatCandidate {
            format_id: id.to_string(),
            width: height * 16 / 9,
            height,
            fps: fps as f64,
            ext: "mp4".to_string(),
            has_audio: false,
            has_video: true,
            size,
            bitrate,
        }
    }

    fn ids(formats: &[FormatCandidate]) -> Vec<&str> {
        formats.iter().map(|f| f.format_id.as_str()).collect()
    }

    #[test]
    fn test_reduce_prefers_higher_fps_over_size() {
        let reduced = reduce(vec![
            row("a", 1080, 30, Some(50 * MB), None),
            row("b", 1080, 60, Some(10 * MB), None),
        ]);
        assert_eq!(ids(&reduced), vec!["b"]);
    }

    #[test]
    fn test_reduce_compares_fractional_fps() {
        let mut ntsc = row("ntsc", 1080, 30, Some(50 * MB), None);
        ntsc.fps = 29.97;
        let reduced = reduce(vec![ntsc, row("full", 1080, 30, Some(10 * MB), None)]);
        assert_eq!(ids(&reduced), vec!["full"]);
        assert!(describe(&reduced[0]).contains("| 30   |"));
    }

    #[test]
    fn test_reduce_prefers_larger_size_on_equal_fps() {
        let reduced = reduce(vec![
            row("small", 720, 30, Some(15 * MB), None),
            row("big", 720, 30, Some(20 * MB), None),
        ]);
        assert_eq!(ids(&reduced), vec!["big"]);

        let reduced = reduce(vec![
            row("big", 720, 30, Some(20 * MB), None),
            row("small", 720, 30, Some(15 * MB), None),
        ]);
        assert_eq!(ids(&reduced), vec!["big"]);
    }

    #[test]
    fn test_reduce_falls_back_to_bitrate() {
        let reduced = reduce(vec![
            row("low", 480, 30, None, Some(800.0)),
            row("high", 480, 30, None, Some(1200.0)),
        ]);
        assert_eq!(ids(&reduced), vec!["high"]);
    }

    #[test]
    fn test_reduce_bitrate_used_when_only_one_side_has_size() {
        // Sizes are not comparable, so bitrate decides.
        let reduced = reduce(vec![
            row("sized", 360, 30, Some(5 * MB), Some(500.0)),
            row("unsized", 360, 30, None, Some(900.0)),
        ]);
        assert_eq!(ids(&reduced), vec!["unsized"]);
    }

    #[test]
    fn test_reduce_prefers_reported_size_or_bitrate() {
        let reduced = reduce(vec![
            row("bare", 240, 30, None, None),
            row("sized", 240, 30, Some(MB), None),
        ]);
        assert_eq!(ids(&reduced), vec!["sized"]);

        let reduced = reduce(vec![
            row("bare", 240, 30, None, None),
            row("rated", 240, 30, None, Some(300.0)),
        ]);
        assert_eq!(ids(&reduced), vec!["rated"]);
    }

    #[test]
    fn test_reduce_full_tie_keeps_first_seen() {
        let reduced = reduce(vec![
            row("first", 1080, 30, Some(MB), None),
            row("second", 1080, 30, Some(MB), None),
        ]);
        assert_eq!(ids(&reduced), vec!["first"]);
    }

    #[test]
    fn test_reduce_drops_audio_only_and_zero_height() {
        let mut audio = row("audio", 0, 0, Some(MB), None);
        audio.has_video = false;
        let mut audio_with_height = row("odd", 144, 0, None, None);
        audio_with_height.has_video = false;

        let reduced = reduce(vec![audio, audio_with_height, row("zero", 0, 30, None, None)]);
        assert!(reduced.is_empty());
    }

    #[test]
    fn test_reduce_sorted_unique_and_idempotent() {
        let raw = vec![
            row("a", 360, 30, None, None),
            row("b", 1080, 30, None, None),
            row("c", 720, 30, None, None),
            row("d", 1080, 60, None, None),
            row("e", 360, 30, Some(MB), None),
        ];
        let reduced = reduce(raw);
        assert_eq!(ids(&reduced), vec!["d", "c", "e"]);

        let heights: Vec<u32> = reduced.iter().map(|f| f.height).collect();
        assert_eq!(heights, vec![1080, 720, 360]);

        let again = reduce(reduced.clone());
        assert_eq!(again, reduced);
    }

    #[test]
    fn test_parse_formats() {
        let json = r#"{
            "title": "Clip",
            "formats": [
                {"format_id": "140", "ext": "m4a", "acodec": "mp4a.40.2", "vcodec": "none", "filesize": 3000000},
                {"format_id": "137", "ext": "mp4", "width": 1920, "height": 1080, "fps": 29.97,
                 "acodec": "none", "vcodec": "avc1", "filesize": null, "filesize_approx": 9000000, "tbr": 4400.5},
                {"format_id": "18", "ext": "mp4", "width": 640, "height": 360, "fps": 30,
                 "acodec": "mp4a.40.2", "vcodec": "avc1", "filesize": 0, "vbr": 500}
            ]
        }"#;

        let formats = parse_formats(json).unwrap();
        assert_eq!(formats.len(), 3);

        assert!(!formats[0].has_video);
        assert!(formats[0].has_audio);

        assert_eq!(formats[1].height, 1080);
        assert_eq!(formats[1].fps, 29.97);
        assert_eq!(formats[1].size, Some(9_000_000));
        assert_eq!(formats[1].bitrate, Some(4400.5));
        assert!(!formats[1].has_audio);

        assert_eq!(formats[2].size, None);
        assert_eq!(formats[2].bitrate, Some(500.0));
        assert!(formats[2].has_audio);

        let reduced = reduce(formats);
        assert_eq!(ids(&reduced), vec!["137", "18"]);
    }

    #[test]
    fn test_parse_formats_rejects_garbage() {
        assert!(parse_formats("not json").is_err());
        assert!(parse_formats("{}").unwrap().is_empty());
    }

    #[test]
    fn test_describe() {
        let mut format = row("137", 1080, 60, Some(MB * 3 / 2), None);
        format.width = 1920;
        assert_eq!(
            describe(&format),
            "137   | 1920x1080 | 60   | mp4  | audio:NO  | 1.5MiB"
        );

        format.size = None;
        format.has_audio = true;
        assert!(describe(&format).ends_with("audio:YES | N/A"));
    }
}
