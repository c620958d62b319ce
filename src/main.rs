//! # Video Conformer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Creazione della configurazione e avvio del batch conformer
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, crf, preset, codec, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che la directory sorgente esista
//! 4. Crea un oggetto Config con tutti i parametri
//! 5. Istanzia BatchConformer e avvia la conformance
//!
//! ## Esempio di utilizzo:
//! ```bash
//! video-conformer /path/to/videos --crf 18 --preset medium --match-codec
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use video_conformer::{BatchConformer, Config, FfprobeInspector, TargetFileMode};
use video_conformer::config::default_codec_map;

#[derive(Parser)]
#[command(name = "video-conformer")]
#[command(about = "Conform a folder of MP4 videos to the highest resolution found among them")]
struct Args {
    /// Directory containing the MP4 files to conform
    source_directory: PathBuf,

    /// Output directory for conformed files (default: <source>/output)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Video encoder used when --match-codec is not set
    #[arg(long, default_value = "libx264")]
    video_codec: String,

    /// Hardware encoder, e.g. "h264_nvenc" (NVIDIA), "h264_qsv" (Intel),
    /// "h264_amf" (AMD). Overrides --video-codec and --match-codec;
    /// preset and CRF are not passed to GPU encoders
    #[arg(long)]
    gpu_encoder: Option<String>,

    /// Video CRF value (0-51, lower = better quality)
    #[arg(short, long, default_value = "18")]
    crf: u8,

    /// Encoder speed/quality preset
    #[arg(short, long, default_value = "medium")]
    preset: String,

    /// Audio handling: "copy" keeps original audio, or an encoder name like "aac"
    #[arg(short, long, default_value = "copy")]
    audio_codec: String,

    /// Pick the encoder from the target file's detected codec
    /// (h264 -> libx264, hevc -> libx265, vp9 -> libvpx-vp9)
    #[arg(long)]
    match_codec: bool,

    /// Fallback encoder when the detected codec is unmapped
    #[arg(long, default_value = "libx264")]
    default_encoder: String,

    /// What to do with the file that defines the target resolution
    #[arg(long, value_enum, default_value_t = TargetFileMode::Copy)]
    target_file_mode: TargetFileMode,

    /// Dry run - log decisions without invoking ffmpeg
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.source_directory.exists() {
        return Err(anyhow::anyhow!(
            "Source directory does not exist: {}",
            args.source_directory.display()
        ));
    }
    if !args.source_directory.is_dir() {
        return Err(anyhow::anyhow!(
            "Source path is not a directory: {}",
            args.source_directory.display()
        ));
    }

    if let Some(ref output_dir) = args.output {
        if !output_dir.exists() {
            tokio::fs::create_dir_all(output_dir).await?;
            info!("Created output directory: {}", output_dir.display());
        }
    }

    let config = Config {
        output_path: args.output,
        gpu_encoder: args.gpu_encoder,
        video_codec: args.video_codec,
        crf: args.crf,
        preset: args.preset,
        audio_codec: args.audio_codec,
        match_codec: args.match_codec,
        codec_map: default_codec_map(),
        default_encoder: args.default_encoder,
        target_file_mode: args.target_file_mode,
        dry_run: args.dry_run,
    };

    let conformer = BatchConformer::new(&args.source_directory, config, FfprobeInspector)?;
    conformer.run().await?;

    Ok(())
}
