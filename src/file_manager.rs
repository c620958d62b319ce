//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file video e le utilità sui file.
//!
//! ## Responsabilità:
//! - Discovery dei file video nella directory sorgente (profondità 1,
//!   come il design originale che lavora su una singola cartella)
//! - Filtro per estensione contenitore, case-insensitive
//! - Ordinamento stabile per path (tie-break del selector riproducibile)
//! - Formattazione human-readable delle dimensioni per il logging
//!
//! ## Esempio:
//! ```ignore
//! let files = FileManager::find_video_files(&source_dir)?;
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find all video files directly inside a directory, sorted by path
    pub fn find_video_files(source_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(source_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if Self::is_video(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();

        Ok(files)
    }

    /// Check if a file is a supported video container
    pub fn is_video(path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            ext_lower == "mp4"
        } else {
            false
        }
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_video_case_insensitive() {
        assert!(FileManager::is_video(Path::new("clip.mp4")));
        assert!(FileManager::is_video(Path::new("CLIP.MP4")));
        assert!(FileManager::is_video(Path::new("clip.Mp4")));
        assert!(!FileManager::is_video(Path::new("clip.mkv")));
        assert!(!FileManager::is_video(Path::new("notes.txt")));
        assert!(!FileManager::is_video(Path::new("no_extension")));
    }

    #[test]
    fn test_find_video_files_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        std::fs::write(dir.join("b.mp4"), b"").unwrap();
        std::fs::write(dir.join("a.MP4"), b"").unwrap();
        std::fs::write(dir.join("skip.txt"), b"").unwrap();
        std::fs::write(dir.join("clip.mkv"), b"").unwrap();

        let files = FileManager::find_video_files(dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.MP4", "b.mp4"]);
    }

    #[test]
    fn test_find_video_files_ignores_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        std::fs::write(dir.join("top.mp4"), b"").unwrap();
        std::fs::create_dir(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested").join("deep.mp4"), b"").unwrap();

        let files = FileManager::find_video_files(dir).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.mp4"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
