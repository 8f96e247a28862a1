use chrono::{DateTime, Local, NaiveDateTime};

use crate::models::entry::Entry;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// `2048 -> "2.0 KB"`. Sizes are divided by 1024 until they fit the unit, capped at TB.
pub fn format_file_size(bytes: Option<u64>) -> String {
    let Some(bytes) = bytes else {
        return String::new();
    };
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", SIZE_UNITS[unit])
}

/// Local-time rendering of a service timestamp. Unparseable input is returned as-is.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
    }
    // Offset-less timestamps are already local to the service host.
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// One-line description used by list renderers.
pub fn describe_entry(entry: &Entry) -> String {
    let mut parts = Vec::new();
    if entry.is_directory() {
        parts.push(format!("{}/", entry.name));
    } else {
        parts.push(entry.name.clone());
        parts.push(format_file_size(entry.size));
    }
    if let Some(count) = entry.session_file_count() {
        parts.push(format!("Session Project ({count} files)"));
    } else if entry.is_session_project {
        parts.push("Session Project".to_string());
    }
    if let Some(modified) = &entry.modified_at {
        parts.push(format!("Modified: {}", format_timestamp(modified)));
    }
    parts.join("  ")
}
