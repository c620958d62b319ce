//! # Media Probing Module
//!
//! Questo modulo isola la dipendenza da ffprobe dietro un'interfaccia stretta.
//!
//! ## Responsabilità:
//! - Ispezione del primo video stream di un file con ffprobe (output JSON)
//! - Estrazione di larghezza/altezza in pixel
//! - Estrazione del nome del codec video
//! - Traduzione di ogni fallimento (exit code, parse, campi mancanti) in `ProbeError`
//!
//! ## Interfaccia sostituibile:
//! Il trait `MediaInspector` permette di sostituire ffprobe con un test double
//! nei test del driver, senza invocare processi esterni.
//!
//! ## Comando invocato:
//! ```text
//! ffprobe -v error -select_streams v:0 \
//!         -show_entries stream=width,height,codec_name -of json <file>
//! ```
//!
//! ## Esempio:
//! ```ignore
//! let inspector = FfprobeInspector;
//! let (width, height) = inspector.probe_resolution(&path)?;
//! let codec = inspector.probe_codec(&path)?;
//! ```

use crate::platform::PlatformCommands;
use std::path::Path;
use std::process::Command;

/// Errors raised while inspecting a media file
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("failed to execute ffprobe: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffprobe exited with an error: {0}")]
    Failed(String),

    #[error("unparseable ffprobe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no video stream found in {0}")]
    MissingStream(String),

    #[error("missing field '{0}' in ffprobe output")]
    MissingField(&'static str),
}

/// Narrow boundary around the external media inspection tool
pub trait MediaInspector {
    /// Pixel width and height of the first video stream
    fn probe_resolution(&self, path: &Path) -> Result<(u32, u32), ProbeError>;

    /// Codec name of the first video stream (e.g. "h264", "hevc")
    fn probe_codec(&self, path: &Path) -> Result<String, ProbeError>;
}

/// `MediaInspector` backed by the system ffprobe binary
pub struct FfprobeInspector;

impl FfprobeInspector {
    /// Run ffprobe on the first video stream and return the parsed stream entry
    fn probe_first_stream(&self, path: &Path) -> Result<serde_json::Value, ProbeError> {
        let platform = PlatformCommands::instance();
        let ffprobe_cmd = platform.get_command("ffprobe");

        let output = Command::new(ffprobe_cmd)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,codec_name",
                "-of",
                "json",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(ProbeError::Failed(
                String::from_utf8_lossy(&output.stderr).to_string(),
            ));
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;

        info["streams"]
            .as_array()
            .and_then(|streams| streams.first())
            .cloned()
            .ok_or_else(|| ProbeError::MissingStream(path.display().to_string()))
    }
}

impl MediaInspector for FfprobeInspector {
    fn probe_resolution(&self, path: &Path) -> Result<(u32, u32), ProbeError> {
        let stream = self.probe_first_stream(path)?;

        let width = stream["width"]
            .as_u64()
            .ok_or(ProbeError::MissingField("width"))? as u32;
        let height = stream["height"]
            .as_u64()
            .ok_or(ProbeError::MissingField("height"))? as u32;

        Ok((width, height))
    }

    fn probe_codec(&self, path: &Path) -> Result<String, ProbeError> {
        let stream = self.probe_first_stream(path)?;

        stream["codec_name"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProbeError::MissingField("codec_name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_probe_missing_file_is_error_not_panic() {
        let inspector = FfprobeInspector;
        let path = PathBuf::from("/definitely/not/a/real/video.mp4");

        // With ffprobe installed this is Failed; without it, Spawn. Never a panic.
        assert!(inspector.probe_resolution(&path).is_err());
        assert!(inspector.probe_codec(&path).is_err());
    }

    #[test]
    fn test_probe_error_display() {
        let err = ProbeError::MissingField("width");
        assert!(err.to_string().contains("width"));

        let err = ProbeError::MissingStream("clip.mp4".to_string());
        assert!(err.to_string().contains("clip.mp4"));
    }
}
