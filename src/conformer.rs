//! # Batch Conformer Module
//!
//! Orchestratore principale: puro sequencing, nessuna logica algoritmica
//! oltre ai moduli delegati.
//!
//! ## Flusso di esecuzione:
//! 1. Discovery dei file MP4 nella directory sorgente
//! 2. Controllo dipendenze esterne (ffmpeg, ffprobe)
//! 3. Probe della risoluzione di ogni file (fallimenti → sentinel 0x0)
//! 4. Selezione del target di conformance (una sola volta per run)
//! 5. Probe del codec del file target (solo con `match_codec`)
//! 6. Creazione della directory di output
//! 7. Loop sequenziale per file: decisione policy → dispatch FFmpeg
//! 8. Statistiche finali
//!
//! ## Gestione errori:
//! - Probe fallito: degradato a sentinel, warning, il batch continua
//! - Nessuna risoluzione utilizzabile: unica condizione fatale
//! - Encode fallito: loggato per file, il batch continua (best-effort)

use crate::{
    config::Config,
    encoder::FfmpegEncoder,
    error::ConformError,
    file_manager::FileManager,
    platform::PlatformCommands,
    policy::{EncoderPolicy, EncodingDecision},
    probe::MediaInspector,
    progress::{ConformanceStats, ProgressManager},
    selector::{select_target, ProbedVideo},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// The per-file decisions for one batch run, computed before any encode
pub struct BatchPlan {
    /// The file the conformance target was selected from
    pub target: ProbedVideo,
    /// Every input file paired with its encoding decision, in enumeration order
    pub entries: Vec<(ProbedVideo, EncodingDecision)>,
}

/// Sequential batch driver
pub struct BatchConformer<I: MediaInspector> {
    config: Config,
    inspector: I,
    encoder: FfmpegEncoder,
    source_dir: PathBuf,
}

impl<I: MediaInspector> BatchConformer<I> {
    /// Create a new conformer for a source directory
    pub fn new(source_dir: &Path, config: Config, inspector: I) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            inspector,
            encoder: FfmpegEncoder,
            source_dir: source_dir.to_path_buf(),
        })
    }

    /// Run the whole batch
    pub async fn run(&self) -> Result<()> {
        let start_time = std::time::Instant::now();

        let files = FileManager::find_video_files(&self.source_dir)?;
        if files.is_empty() {
            info!("No MP4 files found in {}", self.source_dir.display());
            return Ok(());
        }

        self.log_configuration(&files);
        self.check_dependencies().await?;

        // Target and decisions are fixed here, before any encode runs
        let plan = self.plan(&files)?;

        let output_dir = self.output_dir();
        tokio::fs::create_dir_all(&output_dir).await?;

        let progress = ProgressManager::new(plan.entries.len() as u64);
        let stats = self.dispatch(&plan, &output_dir, &progress).await;

        progress.finish(&stats.format_summary());
        info!(
            "=== Conformance complete in {:.1}s ===",
            start_time.elapsed().as_secs_f64()
        );
        info!("{}", stats.format_summary());
        info!("Output directory: {}", output_dir.display());

        Ok(())
    }

    /// Probe every file, select the target and decide each file's fate.
    ///
    /// Fails only when no file yields a usable resolution; in that case no
    /// encode invocation happens at all.
    pub fn plan(&self, files: &[PathBuf]) -> Result<BatchPlan> {
        let videos = self.probe_videos(files);

        let target = select_target(&videos)
            .cloned()
            .ok_or_else(|| ConformError::Selection(
                "could not determine a file with a usable resolution".to_string(),
            ))?;

        info!(
            "Conformance target: {}x{} ({} pixels), from file: {}",
            target.width,
            target.height,
            target.pixel_count(),
            target.path.display()
        );

        let target_codec = self.probe_target_codec(&target);
        let policy = EncoderPolicy::new(&self.config, &target, target_codec.as_deref());

        if self.config.match_codec {
            info!("Batch video encoder: {}", policy.video_codec());
        }

        let entries = videos
            .into_iter()
            .map(|video| {
                let decision = policy.decide(&video, &target.path);
                (video, decision)
            })
            .collect();

        Ok(BatchPlan { target, entries })
    }

    /// Probe each file's resolution, degrading failures to the (0,0) sentinel
    fn probe_videos(&self, files: &[PathBuf]) -> Vec<ProbedVideo> {
        files
            .iter()
            .map(|path| match self.inspector.probe_resolution(path) {
                Ok((width, height)) => ProbedVideo::new(path.clone(), width, height),
                Err(e) => {
                    warn!("Resolution probe failed for {}: {}", path.display(), e);
                    ProbedVideo::new(path.clone(), 0, 0)
                }
            })
            .collect()
    }

    /// Probe the target file's codec; unknown on failure or when matching is off
    fn probe_target_codec(&self, target: &ProbedVideo) -> Option<String> {
        if !self.config.match_codec {
            return None;
        }

        match self.inspector.probe_codec(&target.path) {
            Ok(codec) => {
                info!("Target file codec: {}", codec);
                Some(codec)
            }
            Err(e) => {
                warn!(
                    "Codec probe failed for {}, using default encoder: {}",
                    target.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Sequential per-file dispatch; per-file failures never stop the batch
    async fn dispatch(
        &self,
        plan: &BatchPlan,
        output_dir: &Path,
        progress: &ProgressManager,
    ) -> ConformanceStats {
        let mut stats = ConformanceStats::new();

        for (video, decision) in &plan.entries {
            let file_name = video
                .path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned();
            let output_path = output_dir.join(&file_name);

            self.log_decision(video, decision, &plan.target);

            if self.config.dry_run {
                match decision {
                    EncodingDecision::Skip => stats.add_skipped(),
                    EncodingDecision::Passthrough => stats.add_passthrough(),
                    _ => stats.add_rescaled(),
                }
                progress.update(&format!("(dry run) {}", file_name));
                continue;
            }

            match self.encoder.run(decision, &video.path, &output_path).await {
                Ok(false) => {
                    stats.add_skipped();
                    progress.update(&format!("⏩ {}: skipped", file_name));
                }
                Ok(true) => match decision {
                    EncodingDecision::Passthrough => {
                        stats.add_passthrough();
                        progress.update(&format!("✅ {}: copied", file_name));
                    }
                    _ => {
                        stats.add_rescaled();
                        progress.update(&format!("✅ {}: rescaled", file_name));
                    }
                },
                Err(e) => {
                    error!("Encoding failed for {}: {}", video.path.display(), e);
                    stats.add_error();
                    progress.update(&format!("❌ {}: failed", file_name));
                }
            }
        }

        stats
    }

    fn log_decision(&self, video: &ProbedVideo, decision: &EncodingDecision, target: &ProbedVideo) {
        match decision {
            EncodingDecision::Skip => {
                info!(
                    "Skipping target file {} ({}x{})",
                    video.path.display(),
                    video.width,
                    video.height
                );
            }
            EncodingDecision::Passthrough => {
                info!(
                    "{} already matches {}x{}, pass-through (copy)",
                    video.path.display(),
                    target.width,
                    target.height
                );
            }
            EncodingDecision::Rescale { width, height, .. } => {
                info!(
                    "Scaling {} from {}x{} to {}x{}",
                    video.path.display(),
                    video.width,
                    video.height,
                    width,
                    height
                );
            }
            EncodingDecision::Reencode { params } => {
                info!(
                    "Re-encoding target file {} at {}x{} with {}",
                    video.path.display(),
                    video.width,
                    video.height,
                    params.video_codec
                );
            }
        }
    }

    fn log_configuration(&self, files: &[PathBuf]) {
        info!(
            "Starting video conformance in: {}",
            self.source_dir.display()
        );
        let total_size: u64 = files
            .iter()
            .filter_map(|path| std::fs::metadata(path).ok())
            .map(|metadata| metadata.len())
            .sum();
        info!(
            "Found {} MP4 files ({})",
            files.len(),
            FileManager::format_size(total_size)
        );
        info!(
            "Encoding settings: CRF {} | preset {} | audio {}",
            self.config.crf, self.config.preset, self.config.audio_codec
        );
        if let Some(ref gpu_encoder) = self.config.gpu_encoder {
            info!("GPU encoder: {} (preset/CRF not applied)", gpu_encoder);
        } else if self.config.match_codec {
            info!("Encoder selection: matched to the target file's codec");
        } else {
            info!("Encoder: {}", self.config.video_codec);
        }
        if self.config.dry_run {
            info!("Dry run mode: no files will be encoded");
        }
    }

    /// Resolved output directory (default: `<source>/output`)
    fn output_dir(&self) -> PathBuf {
        self.config
            .output_path
            .clone()
            .unwrap_or_else(|| self.source_dir.join("output"))
    }

    /// Check that required external tools are available
    async fn check_dependencies(&self) -> Result<()> {
        let platform = PlatformCommands::instance();

        for tool in ["ffmpeg", "ffprobe"] {
            if !platform.is_command_available(tool).await {
                return Err(ConformError::MissingDependency(format!(
                    "{} is required for video conformance",
                    tool
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TargetFileMode;
    use crate::probe::ProbeError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Test double for the external inspection tool
    struct StubInspector {
        resolutions: HashMap<PathBuf, (u32, u32)>,
        codecs: HashMap<PathBuf, String>,
    }

    impl StubInspector {
        fn new() -> Self {
            Self {
                resolutions: HashMap::new(),
                codecs: HashMap::new(),
            }
        }

        fn with_resolution(mut self, path: &Path, width: u32, height: u32) -> Self {
            self.resolutions.insert(path.to_path_buf(), (width, height));
            self
        }

        fn with_codec(mut self, path: &Path, codec: &str) -> Self {
            self.codecs.insert(path.to_path_buf(), codec.to_string());
            self
        }
    }

    impl MediaInspector for StubInspector {
        fn probe_resolution(&self, path: &Path) -> Result<(u32, u32), ProbeError> {
            self.resolutions
                .get(path)
                .copied()
                .ok_or_else(|| ProbeError::MissingStream(path.display().to_string()))
        }

        fn probe_codec(&self, path: &Path) -> Result<String, ProbeError> {
            self.codecs
                .get(path)
                .cloned()
                .ok_or_else(|| ProbeError::MissingStream(path.display().to_string()))
        }
    }

    fn touch_mp4(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_plan_for_mixed_resolutions() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch_mp4(temp_dir.path(), "a.mp4");
        let b = touch_mp4(temp_dir.path(), "b.mp4");
        let c = touch_mp4(temp_dir.path(), "c.mp4");

        let inspector = StubInspector::new()
            .with_resolution(&a, 1920, 1080)
            .with_resolution(&b, 3840, 2160)
            .with_resolution(&c, 1920, 1080);

        let conformer =
            BatchConformer::new(temp_dir.path(), Config::default(), inspector).unwrap();
        let files = vec![a.clone(), b.clone(), c.clone()];
        let plan = conformer.plan(&files).unwrap();

        assert_eq!(plan.target.path, b);
        assert_eq!((plan.target.width, plan.target.height), (3840, 2160));

        assert!(matches!(
            plan.entries[0].1,
            EncodingDecision::Rescale { width: 3840, height: 2160, .. }
        ));
        assert_eq!(plan.entries[1].1, EncodingDecision::Passthrough);
        assert!(matches!(
            plan.entries[2].1,
            EncodingDecision::Rescale { width: 3840, height: 2160, .. }
        ));
    }

    #[test]
    fn test_single_probe_failure_does_not_abort_planning() {
        let temp_dir = TempDir::new().unwrap();
        let ok = touch_mp4(temp_dir.path(), "ok.mp4");
        let broken = touch_mp4(temp_dir.path(), "broken.mp4");

        // broken.mp4 has no stub entry, so its probe fails
        let inspector = StubInspector::new().with_resolution(&ok, 1280, 720);

        let conformer =
            BatchConformer::new(temp_dir.path(), Config::default(), inspector).unwrap();
        let plan = conformer.plan(&[broken.clone(), ok.clone()]).unwrap();

        assert_eq!(plan.target.path, ok);

        // The failed file is recorded with the sentinel and still dispatched
        let (probed_broken, decision) = &plan.entries[0];
        assert_eq!((probed_broken.width, probed_broken.height), (0, 0));
        assert!(matches!(decision, EncodingDecision::Rescale { .. }));
    }

    #[test]
    fn test_all_probes_failed_is_fatal_selection_error() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch_mp4(temp_dir.path(), "a.mp4");
        let b = touch_mp4(temp_dir.path(), "b.mp4");

        let inspector = StubInspector::new();
        let conformer =
            BatchConformer::new(temp_dir.path(), Config::default(), inspector).unwrap();

        let result = conformer.plan(&[a, b]);
        assert!(result.is_err());
        let message = result.err().unwrap().to_string();
        assert!(message.contains("usable resolution"));
    }

    #[test]
    fn test_target_codec_drives_every_rescale() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch_mp4(temp_dir.path(), "a.mp4");
        let b = touch_mp4(temp_dir.path(), "b.mp4");

        let inspector = StubInspector::new()
            .with_resolution(&a, 1920, 1080)
            .with_resolution(&b, 3840, 2160)
            .with_codec(&b, "hevc");

        let config = Config {
            match_codec: true,
            ..Default::default()
        };

        let conformer = BatchConformer::new(temp_dir.path(), config, inspector).unwrap();
        let plan = conformer.plan(&[a, b]).unwrap();

        match &plan.entries[0].1 {
            EncodingDecision::Rescale { params, .. } => {
                assert_eq!(params.video_codec, "libx265");
            }
            other => panic!("expected Rescale, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_codec_probe_falls_back_to_default_encoder() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch_mp4(temp_dir.path(), "a.mp4");
        let b = touch_mp4(temp_dir.path(), "b.mp4");

        // Resolution probes succeed, codec probe has no entry for b
        let inspector = StubInspector::new()
            .with_resolution(&a, 1920, 1080)
            .with_resolution(&b, 3840, 2160);

        let config = Config {
            match_codec: true,
            default_encoder: "libx264".to_string(),
            ..Default::default()
        };

        let conformer = BatchConformer::new(temp_dir.path(), config, inspector).unwrap();
        let plan = conformer.plan(&[a, b]).unwrap();

        match &plan.entries[0].1 {
            EncodingDecision::Rescale { params, .. } => {
                assert_eq!(params.video_codec, "libx264");
            }
            other => panic!("expected Rescale, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_mode_leaves_target_out_of_output_set() {
        let temp_dir = TempDir::new().unwrap();
        let a = touch_mp4(temp_dir.path(), "a.mp4");
        let b = touch_mp4(temp_dir.path(), "b.mp4");

        let inspector = StubInspector::new()
            .with_resolution(&a, 1280, 720)
            .with_resolution(&b, 1920, 1080);

        let config = Config {
            target_file_mode: TargetFileMode::Skip,
            ..Default::default()
        };

        let conformer = BatchConformer::new(temp_dir.path(), config, inspector).unwrap();
        let plan = conformer.plan(&[a, b.clone()]).unwrap();

        assert_eq!(plan.target.path, b);
        assert_eq!(plan.entries[1].1, EncodingDecision::Skip);
        assert!(matches!(plan.entries[0].1, EncodingDecision::Rescale { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            crf: 99,
            ..Default::default()
        };

        assert!(BatchConformer::new(temp_dir.path(), config, StubInspector::new()).is_err());
    }
}
