//! # Encoding Dispatch Module
//!
//! Questo modulo traduce le `EncodingDecision` in invocazioni FFmpeg.
//!
//! ## Responsabilità:
//! - Costruzione degli argomenti FFmpeg (funzioni pure, testabili)
//! - Esecuzione dell'encoding verso un file temporaneo
//! - Copia del risultato nella destinazione finale solo a encoding riuscito
//! - Cattura di stderr per diagnostica sugli exit code non-zero
//!
//! ## Forme di invocazione:
//! - Passthrough:  `ffmpeg -y -i IN -c copy OUT`
//! - Rescale:      `ffmpeg -y -i IN -vf scale=W:H -c:v CODEC -preset P -crf N -c:a A OUT`
//! - Rescale GPU:  `ffmpeg -y -i IN -vf scale=W:H -c:v CODEC -c:a A OUT`
//!   (gli encoder hardware non onorano il CRF standard, niente preset/crf)
//! - Reencode:     come rescale ma senza filtro scale
//!
//! Le opzioni globali (`-loglevel`) devono precedere `-i`: FFmpeg ignora le
//! opzioni che seguono il path di output.
//!
//! L'encoding scrive su un file temporaneo e copia sul path finale solo in
//! caso di successo, così un encode fallito non lascia file troncati nella
//! directory di output.

use crate::error::ConformError;
use crate::platform::PlatformCommands;
use crate::policy::{EncodeParams, EncodingDecision};
use anyhow::Result;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::debug;

/// Arguments for a stream-copy passthrough
pub fn passthrough_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-c".to_string(),
        "copy".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

/// Arguments for a re-encode, with an exact scale filter when `scale` is set
pub fn encode_args(
    input: &Path,
    output: &Path,
    params: &EncodeParams,
    scale: Option<(u32, u32)>,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ];

    if let Some((width, height)) = scale {
        args.push("-vf".to_string());
        args.push(format!("scale={}:{}", width, height));
    }

    args.push("-c:v".to_string());
    args.push(params.video_codec.clone());

    // Hardware encoders don't honor standard CRF; quality flags are CPU-only
    if !params.gpu {
        args.extend([
            "-preset".to_string(),
            params.preset.clone(),
            "-crf".to_string(),
            params.crf.to_string(),
        ]);
    }

    args.extend([
        "-c:a".to_string(),
        params.audio_codec.clone(),
        output.to_string_lossy().into_owned(),
    ]);

    args
}

/// Final argv: prepend the global loglevel options, which FFmpeg would
/// ignore if placed after the output path
fn full_ffmpeg_args(args: &[String], debug: bool) -> Vec<String> {
    let mut full = Vec::new();

    // Suppress FFmpeg output unless in debug mode
    if !debug {
        full.push("-loglevel".to_string());
        full.push("warning".to_string());
    }

    full.extend(args.iter().cloned());
    full
}

/// Arguments for a decision, or `None` when the decision produces no output
pub fn decision_args(
    decision: &EncodingDecision,
    input: &Path,
    output: &Path,
) -> Option<Vec<String>> {
    match decision {
        EncodingDecision::Skip => None,
        EncodingDecision::Passthrough => Some(passthrough_args(input, output)),
        EncodingDecision::Rescale {
            width,
            height,
            params,
        } => Some(encode_args(input, output, params, Some((*width, *height)))),
        EncodingDecision::Reencode { params } => Some(encode_args(input, output, params, None)),
    }
}

/// Runs FFmpeg for individual conformance decisions
pub struct FfmpegEncoder;

impl FfmpegEncoder {
    /// Execute a decision: encode to a temp file, then copy to `output`.
    ///
    /// Returns `Ok(false)` for `Skip` (no output produced), `Ok(true)` once
    /// the output file is in place.
    pub async fn run(
        &self,
        decision: &EncodingDecision,
        input: &Path,
        output: &Path,
    ) -> Result<bool> {
        if matches!(decision, EncodingDecision::Skip) {
            return Ok(false);
        }

        let temp_file = NamedTempFile::with_suffix(".mp4")?;
        let temp_path = temp_file.path().to_path_buf();

        let args = match decision_args(decision, input, &temp_path) {
            Some(args) => args,
            None => return Ok(false),
        };

        self.run_ffmpeg(&args, input).await?;

        // Copy only on success; the NamedTempFile cleans itself up either way
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        std::fs::copy(&temp_path, output)?;

        Ok(true)
    }

    async fn run_ffmpeg(&self, args: &[String], input: &Path) -> Result<()> {
        let platform = PlatformCommands::instance();
        let ffmpeg_cmd = platform.get_command("ffmpeg");

        let args = full_ffmpeg_args(args, tracing::enabled!(tracing::Level::DEBUG));

        let mut cmd = Command::new(ffmpeg_cmd);
        cmd.args(&args);

        debug!("Running {} {}", ffmpeg_cmd, args.join(" "));
        let start_time = std::time::Instant::now();

        let output = cmd
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to execute {}: {}", ffmpeg_cmd, e))?;

        let duration = start_time.elapsed();

        if !output.status.success() {
            eprintln!(
                "❌ FFmpeg failed after {:.1}s on {}",
                duration.as_secs_f64(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            return Err(ConformError::FFmpeg(
                String::from_utf8_lossy(&output.stderr).to_string(),
            )
            .into());
        }

        eprintln!("✅ FFmpeg finished in {:.1}s", duration.as_secs_f64());

        Ok(())
    }
}
