//! Common utilities and helpers

use std::path::Path;

/// Encoder thread count sized to the host: 75% of cores, between 1 and 16
pub fn default_thread_count() -> usize {
    let cpu_count = num_cpus::get();
    let optimal_threads = (cpu_count as f64 * 0.75).ceil() as usize;
    optimal_threads.clamp(1, 16)
}

/// Best-effort MIME type for a file on disk, from its extension
pub fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") | Some("qt") => "video/mov",
        Some("avi") => "video/avi",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

/// Format file size for display
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count_bounds() {
        let threads = default_thread_count();
        assert!((1..=16).contains(&threads));
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("clip.MP4")), "video/mp4");
        assert_eq!(guess_mime_type(Path::new("clip.mov")), "video/mov");
        assert_eq!(guess_mime_type(Path::new("clip.avi")), "video/avi");
        assert_eq!(guess_mime_type(Path::new("clip")), "application/octet-stream");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(300 * 1024 * 1024), "300.00 MB");
    }
}
