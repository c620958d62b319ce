//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri di conformance
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `output_path`: Directory di output (default: None = `<source>/output`)
//! - `gpu_encoder`: Encoder hardware (es. "h264_nvenc"; None = encoding CPU)
//! - `video_codec`: Encoder video fisso (default: "libx264")
//! - `crf`: CRF video (0-51, default: 18, più basso = migliore qualità)
//! - `preset`: Preset velocità/qualità x264 (default: "medium")
//! - `audio_codec`: Gestione audio ("copy" = nessuna ricodifica, default)
//! - `match_codec`: Seleziona l'encoder dal codec del file target
//! - `codec_map`: Mappa codec rilevato → encoder
//! - `default_encoder`: Fallback per codec non mappati (default: "libx264")
//! - `target_file_mode`: Cosa fare col file che definisce il target
//! - `dry_run`: Flag per simulazione senza encoding (default: false)
//!
//! ## Validazione:
//! - Controlla che crf sia 0-51
//! - Controlla che preset sia uno dei preset x264 riconosciuti
//! - Controlla che codec/encoder non siano stringhe vuote
//!
//! ## Esempio:
//! ```ignore
//! let config = Config {
//!     crf: 20,
//!     preset: "slow".to_string(),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::policy::TargetFileMode;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Recognized x264-style speed/quality presets
const KNOWN_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Configuration for batch video conformance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output directory for conformed files (None = `<source>/output`)
    pub output_path: Option<PathBuf>,
    /// Hardware encoder (e.g. "h264_nvenc", "hevc_nvenc", "h264_qsv").
    /// Takes precedence over `video_codec` and `match_codec`; GPU encoders
    /// don't honor CRF, so preset/CRF are not passed to them.
    pub gpu_encoder: Option<String>,
    /// Video encoder used when codec matching is disabled
    pub video_codec: String,
    /// Video CRF value (0-51, lower = better quality)
    pub crf: u8,
    /// Encoder speed/quality preset
    pub preset: String,
    /// Audio handling: "copy" keeps original audio, otherwise an encoder name (e.g. "aac")
    pub audio_codec: String,
    /// Derive the encoder from the target file's detected codec
    pub match_codec: bool,
    /// Detected codec name → encoder name
    pub codec_map: HashMap<String, String>,
    /// Encoder used when the detected codec is not in `codec_map`
    pub default_encoder: String,
    /// What to do with the file that defines the conformance target
    pub target_file_mode: TargetFileMode,
    /// Dry run - log decisions without invoking ffmpeg
    pub dry_run: bool,
}

/// Default mapping from probed codec names to encoders
pub fn default_codec_map() -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("h264".to_string(), "libx264".to_string());
    map.insert("hevc".to_string(), "libx265".to_string());
    map.insert("vp9".to_string(), "libvpx-vp9".to_string());
    map
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: None,
            gpu_encoder: None,
            video_codec: "libx264".to_string(),
            crf: 18,
            preset: "medium".to_string(),
            audio_codec: "copy".to_string(),
            match_codec: false,
            codec_map: default_codec_map(),
            default_encoder: "libx264".to_string(),
            target_file_mode: TargetFileMode::Copy,
            dry_run: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.crf > 51 {
            return Err(anyhow::anyhow!("CRF must be between 0 and 51"));
        }

        if !KNOWN_PRESETS.contains(&self.preset.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown preset '{}' (expected one of: {})",
                self.preset,
                KNOWN_PRESETS.join(", ")
            ));
        }

        if self.video_codec.is_empty() {
            return Err(anyhow::anyhow!("Video codec must not be empty"));
        }

        if self.audio_codec.is_empty() {
            return Err(anyhow::anyhow!("Audio codec must not be empty"));
        }

        if self.default_encoder.is_empty() {
            return Err(anyhow::anyhow!("Default encoder must not be empty"));
        }

        if let Some(ref gpu_encoder) = self.gpu_encoder {
            if gpu_encoder.is_empty() {
                return Err(anyhow::anyhow!("GPU encoder must not be empty"));
            }
        }

        if self.match_codec && self.codec_map.is_empty() {
            return Err(anyhow::anyhow!(
                "Codec map must not be empty when codec matching is enabled"
            ));
        }

        // Validate output path if specified
        if let Some(ref output_path) = self.output_path {
            if output_path.exists() && !output_path.is_dir() {
                return Err(anyhow::anyhow!(
                    "Output path is not a directory: {}",
                    output_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
