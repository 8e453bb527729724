//! Command implementations

mod build;
mod config;
mod get;
mod list;
mod verify;

pub use build::execute as build;
pub use config::execute as config;
pub use get::execute as get;
pub use list::execute as list;
pub use verify::execute as verify;

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
