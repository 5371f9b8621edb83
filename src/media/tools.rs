use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

const REQUIRED_TOOLS: [&str; 4] = ["yt-dlp", "svtplay-dl", "mpv", "ffmpeg"];

/// Names of required programs that are not on `PATH`.
pub fn missing_dependencies() -> Vec<String> {
    missing_with(|program| which::which(program).is_ok(), cfg!(target_os = "linux"))
}

fn missing_with(found: impl Fn(&str) -> bool, needs_clipboard_tool: bool) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_TOOLS
        .iter()
        .filter(|tool| !found(tool))
        .map(|tool| tool.to_string())
        .collect();

    if needs_clipboard_tool && !found("wl-paste") && !found("xclip") {
        missing.push("wl-paste or xclip".to_string());
    }

    missing
}

/// Put `bin_dir` first on `PATH` so updated tools win over system ones.
pub fn prepend_to_path(bin_dir: &Path) {
    let mut paths = vec![bin_dir.to_path_buf()];
    if let Some(existing) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&existing));
    }

    match std::env::join_paths(paths) {
        Ok(joined) => std::env::set_var("PATH", joined),
        Err(e) => warn!("Could not add {} to PATH: {}", bin_dir.display(), e),
    }
}

/// A single binary published as a GitHub release asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: &'static str,
    pub url: String,
    pub local_name: &'static str,
}

const YTDLP_RELEASES: &str = "https://github.com/yt-dlp/yt-dlp/releases/latest/download";
const SVTPLAY_RELEASES: &str = "https://github.com/spaam/svtplay-dl/releases/latest/download";

/// Assets to fetch for the given OS (`std::env::consts::OS` naming).
pub fn release_assets(os: &str) -> Vec<ReleaseAsset> {
    let (ytdlp_remote, ytdlp_local) = match os {
        "windows" => ("yt-dlp.exe", "yt-dlp.exe"),
        "macos" => ("yt-dlp_macos", "yt-dlp"),
        _ => ("yt-dlp", "yt-dlp"),
    };

    let mut assets = vec![ReleaseAsset {
        name: "yt-dlp",
        url: format!("{}/{}", YTDLP_RELEASES, ytdlp_remote),
        local_name: ytdlp_local,
    }];

    // svtplay-dl only ships a zip for macOS
    if os != "macos" {
        let svt = if os == "windows" {
            "svtplay-dl.exe"
        } else {
            "svtplay-dl"
        };
        assets.push(ReleaseAsset {
            name: "svtplay-dl",
            url: format!("{}/{}", SVTPLAY_RELEASES, svt),
            local_name: svt,
        });
    }

    assets
}

async fn fetch_asset(client: &reqwest::Client, asset: &ReleaseAsset, bin_dir: &Path) -> Result<PathBuf> {
    info!("Downloading {} from {}", asset.name, asset.url);

    let response = client
        .get(&asset.url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", asset.name))?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "Failed to download {}: HTTP {}",
            asset.name,
            response.status()
        ));
    }

    let data = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read {}", asset.name))?;

    let mut file = NamedTempFile::new_in(bin_dir)?;
    file.write_all(&data)?;

    let target = bin_dir.join(asset.local_name);
    file.persist(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))?;
    }

    info!("Installed {} ({} bytes) at {}", asset.name, data.len(), target.display());
    Ok(target)
}

/// Download the latest tool releases into `bin_dir`, one result per asset.
pub async fn update_tools(bin_dir: &Path) -> Result<Vec<(&'static str, Result<PathBuf>)>> {
    std::fs::create_dir_all(bin_dir)
        .with_context(|| format!("Could not create directory {}", bin_dir.display()))?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()
        .context("Failed to create HTTP client")?;

    let mut results = Vec::new();
    for asset in release_assets(std::env::consts::OS) {
        let result = fetch_asset(&client, &asset, bin_dir).await;
        if let Err(e) = &result {
            warn!("Update of {} failed: {:#}", asset.name, e);
        }
        results.push((asset.name, result));
    }

    Ok(results)
}
