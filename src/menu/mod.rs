pub mod dispatcher;
pub mod ui;

use crate::batch;
use crate::history::{HistoryEntry, HistoryStore};
use crate::media::{
    is_supported, tools, CookieBrowser, LastAction, Session, ToolRunner, ValidationFailure,
};
use crate::utils::clipboard::{Clipboard, SystemClipboard};
use crate::utils::menu_title;
use anyhow::Result;
use dispatcher::Dispatcher;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use ui::{Tone, Ui};

/// Clipboard text to pre-fill the link prompt with. Streams suppress it,
/// since the same link is usually still on the clipboard.
pub fn prefill(clipboard: &str, last_action: LastAction) -> String {
    let cleaned = clipboard.trim();
    if last_action != LastAction::Stream && is_supported(cleaned) {
        cleaned.to_string()
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuItem {
    PasteLink,
    Batch,
    UpdateTools,
    CookieBrowser,
    Recent(String),
    Exit,
}

fn main_menu_items(history: &[HistoryEntry]) -> Vec<(String, MenuItem)> {
    let mut items = vec![
        ("Paste link".to_string(), MenuItem::PasteLink),
        ("Batch download from file".to_string(), MenuItem::Batch),
        ("Update tools".to_string(), MenuItem::UpdateTools),
        ("Select cookie browser".to_string(), MenuItem::CookieBrowser),
    ];
    items.extend(history.iter().map(|entry| {
        (
            format!("Recent: {}", menu_title(&entry.title)),
            MenuItem::Recent(entry.url.clone()),
        )
    }));
    items.push(("Exit".to_string(), MenuItem::Exit));
    items
}

enum Flow {
    Dispatch(String),
    Continue,
    Exit,
}

/// The interactive loop: prompt for a link, dispatch it, ask what next.
pub struct App<'a> {
    session: Session,
    runner: &'a dyn ToolRunner,
    history: HistoryStore,
    ui: &'a dyn Ui,
    bin_dir: PathBuf,
    clipboard: Box<dyn Clipboard>,
    last_action: LastAction,
}

impl<'a> App<'a> {
    pub fn new(
        session: Session,
        runner: &'a dyn ToolRunner,
        history: HistoryStore,
        ui: &'a dyn Ui,
        bin_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            runner,
            history,
            ui,
            bin_dir,
            clipboard: Box::new(SystemClipboard),
            last_action: LastAction::None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let clipboard = self.clipboard.read().await;
            let initial = prefill(&clipboard, self.last_action);
            self.last_action = LastAction::None;

            let typed = self
                .ui
                .input("Paste/type a URL (leave empty for menu)", &initial)?
                .unwrap_or_default();
            let typed = typed.trim();

            let url = if typed.is_empty() {
                match self.main_menu().await? {
                    Flow::Dispatch(url) => url,
                    Flow::Continue => continue,
                    Flow::Exit => break,
                }
            } else {
                typed.to_string()
            };

            let report = Dispatcher::new(&self.session, self.runner, &self.history, self.ui)
                .dispatch(&url)
                .await?;
            info!("Dispatch of {} ended with {:?}", url, report.outcome);
            self.last_action = report.last_action;

            if let Flow::Exit = self.next_step().await? {
                break;
            }
        }

        info!("Exiting");
        Ok(())
    }

    async fn main_menu(&mut self) -> Result<Flow> {
        let items = main_menu_items(&self.history.load());
        let labels: Vec<String> = items.iter().map(|(label, _)| label.clone()).collect();

        let Some(index) = self.ui.choose("QuickTube\nMain Menu", &labels)? else {
            return Ok(Flow::Exit);
        };

        match items.into_iter().nth(index).map(|(_, item)| item) {
            Some(MenuItem::PasteLink) => Ok(Flow::Continue),
            Some(MenuItem::Batch) => {
                self.batch_from_menu().await?;
                Ok(Flow::Continue)
            }
            Some(MenuItem::UpdateTools) => {
                self.run_update().await?;
                Ok(Flow::Continue)
            }
            Some(MenuItem::CookieBrowser) => {
                self.select_cookie_browser()?;
                Ok(Flow::Continue)
            }
            Some(MenuItem::Recent(url)) => Ok(Flow::Dispatch(url)),
            Some(MenuItem::Exit) | None => Ok(Flow::Exit),
        }
    }

    async fn next_step(&mut self) -> Result<Flow> {
        let items: Vec<String> = ["New link", "Update tools", "Select cookie browser", "Exit"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        match self.ui.choose("What next?", &items)? {
            Some(0) => Ok(Flow::Continue),
            Some(1) => {
                self.run_update().await?;
                Ok(Flow::Continue)
            }
            Some(2) => {
                self.select_cookie_browser()?;
                Ok(Flow::Continue)
            }
            _ => Ok(Flow::Exit),
        }
    }

    fn select_cookie_browser(&mut self) -> Result<()> {
        let mut items = vec!["None (Default)".to_string()];
        items.extend(CookieBrowser::ALL.iter().map(|b| b.to_string()));

        let header = "Select browser to borrow cookies from (fixes 'Bot' errors):";
        match self.ui.choose(header, &items)? {
            None => {}
            Some(0) => {
                self.session.cookie_browser = None;
                self.ui.notice(Tone::Info, "Cookies disabled.");
            }
            Some(index) => {
                self.session.cookie_browser = CookieBrowser::ALL.get(index - 1).copied();
                if let Some(browser) = self.session.cookie_browser {
                    info!("Cookie browser set to {}", browser);
                    self.ui
                        .notice(Tone::Info, &format!("Browser selected: {}", browser));
                }
            }
        }
        Ok(())
    }

    async fn run_update(&self) -> Result<()> {
        update_tools(self.ui, &self.bin_dir).await
    }

    async fn batch_from_menu(&self) -> Result<()> {
        let Some(path) = self
            .ui
            .input("Enter the path to your link file (e.g. links.txt)", "")?
        else {
            return Ok(());
        };
        let path = path.trim();
        if path.is_empty() {
            let failure = ValidationFailure::MissingBatchFile(String::new());
            self.ui.notice(Tone::Error, &failure.to_string());
            self.ui.pause("Press Enter to continue...");
            return Ok(());
        }

        let Some(mode) = batch::choose_mode(self.ui)? else {
            return Ok(());
        };

        if let Err(e) =
            batch::run_batch(Path::new(path), mode, &self.session, self.runner, self.ui).await
        {
            warn!("Batch from {} failed: {:#}", path, e);
            self.ui.notice(Tone::Error, &format!("{e:#}"));
        }

        self.ui.pause("Press Enter to continue...");
        Ok(())
    }
}

/// Confirm, then fetch the latest yt-dlp and svtplay-dl into `bin_dir`.
pub async fn update_tools(ui: &dyn Ui, bin_dir: &Path) -> Result<()> {
    ui.notice(
        Tone::Hint,
        &format!("Tools will be installed/updated in: {}", bin_dir.display()),
    );

    let items = vec!["Yes, update".to_string(), "Cancel".to_string()];
    if ui.choose(
        "Do you want to download the latest yt-dlp and svtplay-dl?",
        &items,
    )? != Some(0)
    {
        return Ok(());
    }

    match tools::update_tools(bin_dir).await {
        Ok(results) => {
            for (name, result) in results {
                match result {
                    Ok(_) => ui.notice(Tone::Success, &format!("{} updated.", name)),
                    Err(e) => ui.notice(
                        Tone::Error,
                        &format!("Failed to update {}: {:#}", name, e),
                    ),
                }
            }
            if cfg!(target_os = "macos") {
                ui.notice(
                    Tone::Hint,
                    "svtplay-dl update on Mac requires manual handling (zip).",
                );
            }
            ui.notice(
                Tone::Info,
                "Done. Restart the program to use the new versions.",
            );
        }
        Err(e) => ui.notice(Tone::Error, &format!("{e:#}")),
    }

    ui.pause("Press Enter to continue...");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::FakeRunner;
    use crate::utils::clipboard::FixedClipboard;
    use ui::scripted::ScriptedUi;

    const VIDEO: &str = "https://www.youtube.com/watch?v=abc";

    fn app<'a>(runner: &'a FakeRunner, ui: &'a ScriptedUi, dir: &Path) -> App<'a> {
        let mut app = App::new(
            Session::default(),
            runner,
            HistoryStore::in_dir(dir),
            ui,
            dir.join("bin"),
        );
        app.clipboard = Box::new(FixedClipboard(String::new()));
        app
    }

    #[test]
    fn test_prefill() {
        assert_eq!(prefill(" https://youtu.be/a \n", LastAction::None), "https://youtu.be/a");
        assert_eq!(prefill("https://youtu.be/a", LastAction::Download), "https://youtu.be/a");
        assert_eq!(prefill("https://youtu.be/a", LastAction::Stream), "");
        assert_eq!(prefill("just some text", LastAction::None), "");
    }

    #[test]
    fn test_main_menu_items_include_history() {
        let history = vec![HistoryEntry {
            title: "A very long title that certainly exceeds forty characters".to_string(),
            url: "https://youtu.be/x".to_string(),
        }];
        let items = main_menu_items(&history);
        assert_eq!(items.len(), 6);
        assert_eq!(items[4].0, "Recent: A very long title that certainly exceeds..");
        assert_eq!(items[4].1, MenuItem::Recent("https://youtu.be/x".to_string()));
        assert_eq!(items[5].1, MenuItem::Exit);
    }

    #[tokio::test]
    async fn test_cancel_main_menu_exits() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new();
        let ui = ScriptedUi::new().type_text("").back();

        app(&runner, &ui, dir.path()).run().await.unwrap();

        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_history_entry_is_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        HistoryStore::in_dir(dir.path()).add("Old clip", VIDEO);

        let runner = FakeRunner::new().with_capture(true, r#"{"title": "Old clip"}"#, "");
        let ui = ScriptedUi::new()
            .type_text("")
            .choose_item("Recent: Old clip")
            .choose_item("Stream Video")
            .choose_item("Exit");

        app(&runner, &ui, dir.path()).run().await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].argv(), vec!["mpv", "--no-terminal", VIDEO]);
    }

    #[tokio::test]
    async fn test_stream_suppresses_next_prefill() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().with_capture(true, r#"{"title": "Clip"}"#, "");
        // No typed answers: every prompt accepts its pre-filled value.
        let ui = ScriptedUi::new()
            .choose_item("Stream Video")
            .choose_item("New link")
            .choose_item("Exit");

        let mut app = app(&runner, &ui, dir.path());
        app.clipboard = Box::new(FixedClipboard(format!("  {}\n", VIDEO)));
        app.run().await.unwrap();

        // The first prompt took the clipboard link. After the stream the
        // second prompt was left empty, so the main menu opened.
        assert_eq!(runner.calls().len(), 2);
        let headers = ui.headers.borrow();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[2], "QuickTube\nMain Menu");
    }

    #[tokio::test]
    async fn test_select_cookie_browser_applies_to_queries() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().with_capture(false, "", "bot");
        let ui = ScriptedUi::new()
            .type_text("")
            .choose_item("Select cookie browser")
            .choose_item("firefox")
            .type_text(VIDEO)
            .choose_item("Exit");

        app(&runner, &ui, dir.path()).run().await.unwrap();

        assert!(ui.has_notice(Tone::Info, "Browser selected: firefox"));
        assert_eq!(
            runner.calls()[0].to_string(),
            format!(
                "yt-dlp --flat-playlist --dump-json --no-warnings --cookies-from-browser firefox {}",
                VIDEO
            )
        );
        assert!(!ui.has_notice(Tone::Hint, "cookies"));
    }

    #[tokio::test]
    async fn test_update_tools_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let ui = ScriptedUi::new().choose_item("Cancel");

        update_tools(&ui, &dir.path().join("bin")).await.unwrap();

        assert!(!dir.path().join("bin").exists());
    }

    #[tokio::test]
    async fn test_batch_from_menu_reports_empty_path() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new();
        let ui = ScriptedUi::new()
            .type_text("")
            .choose_item("Batch download from file")
            .type_text("   ")
            .type_text("")
            .back();

        app(&runner, &ui, dir.path()).run().await.unwrap();

        assert!(ui.has_notice(Tone::Error, "No link file given"));
        assert_eq!(ui.headers.borrow().len(), 2);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_from_menu_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new();
        let ui = ScriptedUi::new()
            .type_text("")
            .choose_item("Batch download from file")
            .type_text("/definitely/not/here.txt")
            .choose_item("Video")
            .type_text("")
            .back();

        app(&runner, &ui, dir.path()).run().await.unwrap();

        assert!(ui.has_notice(Tone::Error, "File not found"));
        assert!(runner.calls().is_empty());
    }
}
