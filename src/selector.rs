//! # Target Selection Module
//!
//! Questo modulo seleziona la risoluzione di conformance per l'intero batch.
//!
//! ## Responsabilità:
//! - Scansione lineare delle risoluzioni rilevate
//! - Selezione del file con il massimo numero di pixel (width × height)
//! - Tie-break stabile: a parità di pixel vince il primo file incontrato
//! - Segnala assenza di target quando tutti i probe sono falliti
//!
//! L'ordine di enumerazione determina il tie-break: il driver ordina i file
//! per path, quindi il risultato è riproducibile all'interno di una run ma
//! non garantito identico tra piattaforme diverse.

use std::path::PathBuf;

/// A video file with its probed resolution
///
/// A failed probe is recorded as the `(0, 0)` sentinel: the file contributes
/// zero pixels to target selection but is still processed downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbedVideo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ProbedVideo {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    /// Total pixel count, the quantity the target is ranked by
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Select the conformance target: the video with strictly maximum pixel count.
///
/// Ties resolve to the first video in slice order. Returns `None` when the
/// slice is empty or every entry probed to zero pixels, which is the only
/// fatal condition of a batch run.
pub fn select_target(videos: &[ProbedVideo]) -> Option<&ProbedVideo> {
    let mut best: Option<&ProbedVideo> = None;
    let mut max_pixels: u64 = 0;

    for video in videos {
        if video.pixel_count() > max_pixels {
            max_pixels = video.pixel_count();
            best = Some(video);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probed(name: &str, w: u32, h: u32) -> ProbedVideo {
        ProbedVideo::new(name, w, h)
    }

    #[test]
    fn test_selects_max_pixel_count() {
        let videos = vec![
            probed("a.mp4", 1920, 1080),
            probed("b.mp4", 3840, 2160),
            probed("c.mp4", 1920, 1080),
        ];

        let target = select_target(&videos).unwrap();
        assert_eq!(target.path, PathBuf::from("b.mp4"));
        assert_eq!((target.width, target.height), (3840, 2160));
    }

    #[test]
    fn test_tie_breaks_to_first_seen() {
        // Same pixel count, different shapes: the first wins
        let videos = vec![
            probed("first.mp4", 1920, 1080),
            probed("second.mp4", 1080, 1920),
            probed("third.mp4", 1920, 1080),
        ];

        let target = select_target(&videos).unwrap();
        assert_eq!(target.path, PathBuf::from("first.mp4"));
    }

    #[test]
    fn test_pixel_count_beats_single_dimension() {
        // 2560x1080 has fewer pixels than 1920x1440 despite being wider
        let videos = vec![probed("wide.mp4", 2560, 1080), probed("tall.mp4", 1920, 1440)];

        let target = select_target(&videos).unwrap();
        assert_eq!(target.path, PathBuf::from("tall.mp4"));
    }

    #[test]
    fn test_all_failed_probes_yield_no_target() {
        let videos = vec![probed("a.mp4", 0, 0), probed("b.mp4", 0, 0)];
        assert!(select_target(&videos).is_none());
    }

    #[test]
    fn test_empty_batch_yields_no_target() {
        assert!(select_target(&[]).is_none());
    }

    #[test]
    fn test_failed_probe_does_not_shadow_valid_file() {
        let videos = vec![probed("broken.mp4", 0, 0), probed("ok.mp4", 1280, 720)];

        let target = select_target(&videos).unwrap();
        assert_eq!(target.path, PathBuf::from("ok.mp4"));
    }

    #[test]
    fn test_pixel_count_does_not_overflow_u32() {
        // 8K-and-beyond products exceed u32::MAX
        let video = probed("huge.mp4", 65_536, 65_536);
        assert_eq!(video.pixel_count(), 4_294_967_296);
    }
}
