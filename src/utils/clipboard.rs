use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Source of the text the link prompt is pre-filled with.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Current clipboard text, or an empty string when nothing can be read.
    async fn read(&self) -> String;
}

/// Reads the desktop clipboard through the platform's command line tools.
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn read(&self) -> String {
        let sources: &[(&str, &[&str])] = if cfg!(windows) {
            &[("powershell", &["-command", "Get-Clipboard"])]
        } else {
            &[
                ("wl-paste", &[]),
                ("xclip", &["-o", "-selection", "clipboard"]),
                ("pbpaste", &[]),
            ]
        };

        for (program, args) in sources {
            if which::which(program).is_ok() {
                return read_from(program, args)
                    .await
                    .map(|s| clean(&s))
                    .unwrap_or_default();
            }
        }

        String::new()
    }
}

async fn read_from(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        debug!("{} exited with {}", program, output.status);
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn clean(raw: &str) -> String {
    raw.replace('\0', "").trim().to_string()
}

/// Clipboard with fixed contents.
#[cfg(test)]
pub struct FixedClipboard(pub String);

#[cfg(test)]
#[async_trait]
impl Clipboard for FixedClipboard {
    async fn read(&self) -> String {
        clean(&self.0)
    }
}
