//! # Encoder Policy Module
//!
//! Questo modulo decide, per ogni file, se copiare o ricodificare con scaling.
//!
//! ## Responsabilità:
//! - Decisione passthrough vs rescale rispetto al target di conformance
//! - Gestione configurabile del file che definisce il target (copy/skip/reencode)
//! - Selezione dell'encoder video: fisso, oppure mappato dal codec rilevato
//! - Parametri di qualità (CRF, preset, audio) costanti per l'intero batch
//!
//! ## Regole:
//! - Risoluzione uguale al target → passthrough, mai scaling (mai upscale)
//! - Risoluzione diversa → rescale esatto a `target.width x target.height`
//!   (scaling non uniforme: l'aspect ratio NON viene preservato, scelta
//!   deliberata del design originale)
//!
//! ## Selezione encoder:
//! Precedenza: `gpu_encoder`, poi `match_codec`, poi `video_codec` fisso. Gli
//! encoder hardware (NVENC, QSV, AMF) non onorano il CRF standard, quindi
//! il path GPU non riceve `-preset`/`-crf`.
//!
//! ## Selezione encoder con `match_codec`:
//! L'encoder viene derivato dal codec del file *target* (quello a risoluzione
//! massima) e applicato uniformemente a tutti i file ricodificati, non dal
//! codec di ciascun file. Comportamento documentato del design originale,
//! mantenuto così com'è; disattivabile lasciando `match_codec = false`.

use crate::config::Config;
use crate::selector::ProbedVideo;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do with the file that itself defines the conformance target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetFileMode {
    /// Stream-copy the target file into the output directory
    Copy,
    /// Leave the target file out of the output set entirely
    Skip,
    /// Re-encode the target file at its own resolution (still never scaled)
    Reencode,
}

/// Encoding parameters shared by every re-encoded file in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeParams {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    /// Hardware encoder in use: preset and CRF are not passed to ffmpeg
    pub gpu: bool,
}

/// Per-file outcome of the encoder policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingDecision {
    /// Do not produce an output for this file
    Skip,
    /// Stream-copy video and audio, preserving original bytes
    Passthrough,
    /// Re-encode with an exact scale filter to the target resolution
    Rescale {
        width: u32,
        height: u32,
        params: EncodeParams,
    },
    /// Re-encode at the file's own resolution, no scale filter
    Reencode { params: EncodeParams },
}

/// Pick the video encoder for the batch.
///
/// A configured GPU encoder wins outright. Otherwise, with codec matching
/// disabled this is the fixed configured codec; with it enabled, the
/// *target* file's probed codec is looked up in the codec map, falling back
/// to the default encoder when unmapped or unknown.
pub fn select_encoder(config: &Config, target_codec: Option<&str>) -> String {
    if let Some(ref gpu_encoder) = config.gpu_encoder {
        return gpu_encoder.clone();
    }

    if !config.match_codec {
        return config.video_codec.clone();
    }

    target_codec
        .and_then(|codec| config.codec_map.get(codec))
        .cloned()
        .unwrap_or_else(|| config.default_encoder.clone())
}

/// Batch-wide encoding policy, fixed once the target is known
pub struct EncoderPolicy {
    target_width: u32,
    target_height: u32,
    params: EncodeParams,
    target_file_mode: TargetFileMode,
}

impl EncoderPolicy {
    /// Build the policy for a batch from its config, target and probed target codec
    pub fn new(config: &Config, target: &ProbedVideo, target_codec: Option<&str>) -> Self {
        Self {
            target_width: target.width,
            target_height: target.height,
            params: EncodeParams {
                video_codec: select_encoder(config, target_codec),
                preset: config.preset.clone(),
                crf: config.crf,
                audio_codec: config.audio_codec.clone(),
                gpu: config.gpu_encoder.is_some(),
            },
            target_file_mode: config.target_file_mode,
        }
    }

    /// The conformance target resolution this policy was built for
    pub fn target_resolution(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// The encoder applied to every re-encoded file in the batch
    pub fn video_codec(&self) -> &str {
        &self.params.video_codec
    }

    /// Decide what to do with a single file.
    ///
    /// `target_path` identifies the file the target was selected from, which
    /// follows `TargetFileMode` instead of the resolution comparison.
    pub fn decide(&self, file: &ProbedVideo, target_path: &Path) -> EncodingDecision {
        if file.path == target_path {
            return match self.target_file_mode {
                TargetFileMode::Copy => EncodingDecision::Passthrough,
                TargetFileMode::Skip => EncodingDecision::Skip,
                TargetFileMode::Reencode => EncodingDecision::Reencode {
                    params: self.params.clone(),
                },
            };
        }

        if (file.width, file.height) == (self.target_width, self.target_height) {
            // Already at the target, never scaled
            EncodingDecision::Passthrough
        } else {
            EncodingDecision::Rescale {
                width: self.target_width,
                height: self.target_height,
                params: self.params.clone(),
            }
        }
    }
}
