use colored::*;
use std::path::Path;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count (binary units)
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    match unit {
        0 => format!("{} B", bytes),
        1 => format!("{:.1} {}", value, UNITS[unit]),
        _ => format!("{:.2} {}", value, UNITS[unit]),
    }
}

/// Size colored by how much a photo library stands to gain
pub fn format_size_colored(bytes: u64) -> ColoredString {
    const MB: u64 = 1024 * 1024;
    let s = format_size(bytes);
    match bytes {
        b if b >= 500 * MB => s.red().bold(),
        b if b >= 50 * MB => s.yellow(),
        0 => s.dimmed(),
        _ => s.white(),
    }
}

pub fn format_count(count: usize) -> String {
    match count {
        1 => "1 image".to_string(),
        n => format!("{} images", n),
    }
}

/// Path for display, with the home directory shortened to ~
pub fn format_path(path: &Path) -> String {
    dirs::home_dir()
        .and_then(|home| path.strip_prefix(home).ok().map(|rest| format!("~/{}", rest.display())))
        .unwrap_or_else(|| path.display().to_string())
}

pub fn format_duration(secs: f64) -> String {
    match secs {
        s if s < 1.0 => format!("{:.0}ms", s * 1000.0),
        s if s < 60.0 => format!("{:.1}s", s),
        s => {
            let whole = s as u64;
            format!("{}m {}s", whole / 60, whole % 60)
        }
    }
}

/// Pixel dimensions, or a dash when unknown
pub fn format_dimensions(width: u32, height: u32) -> String {
    if width == 0 || height == 0 {
        "-".to_string()
    } else {
        format!("{}x{}", width, height)
    }
}

/// Shorten to `max_len` chars, ending in "..."
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
