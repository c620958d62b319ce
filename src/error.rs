//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `ConformError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Probe`: Errori di ispezione metadata con ffprobe
//! - `FFmpeg`: Errori di encoding con FFmpeg
//! - `Selection`: Nessun file con risoluzione utilizzabile (fatale per il batch)
//! - `MissingDependency`: Tool esterno mancante (ffmpeg, ffprobe)
//! - `Validation`: Errori di validazione input
//!
//! ## Esempio:
//! ```ignore
//! if !tool_exists {
//!     return Err(ConformError::MissingDependency("ffmpeg".to_string()));
//! }
//! ```

use crate::probe::ProbeError;

/// Custom error types for batch video conformance
#[derive(thiserror::Error, Debug)]
pub enum ConformError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
