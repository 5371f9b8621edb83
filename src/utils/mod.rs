pub mod clipboard;

pub fn format_mib(bytes: u64) -> String {
    format!("{:.1}MiB", bytes as f64 / (1024.0 * 1024.0))
}

/// Shorten `text` to at most `max` characters, replacing the tail with
/// `marker` when it does not fit.
pub fn truncate(text: &str, max: usize, keep: usize, marker: &str) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(keep).collect();
        format!("{}{}", head, marker)
    } else {
        text.to_string()
    }
}

/// Title shown in action-menu headers.
pub fn header_title(title: &str) -> String {
    truncate(title, 60, 57, "...")
}

/// Title shown for a history entry in the main menu.
pub fn menu_title(title: &str) -> String {
    truncate(title, 40, 40, "..")
}
