//! # Video Conformer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `probe`: Ispezione metadata video tramite ffprobe (risoluzione, codec)
//! - `selector`: Selezione del target di conformance (massimo pixel count)
//! - `policy`: Decisione passthrough/rescale e selezione encoder
//! - `encoder`: Costruzione argomenti e invocazione FFmpeg
//! - `file_manager`: Discovery file video e utilità
//! - `conformer`: Driver sequenziale del batch
//! - `progress`: Progress tracking e statistiche
//!
//! ## Utilizzo:
//! ```ignore
//! use video_conformer::{BatchConformer, Config, FfprobeInspector};
//!
//! let config = Config::default();
//! let conformer = BatchConformer::new(&path, config, FfprobeInspector)?;
//! conformer.run().await?;
//! ```

pub mod config;
pub mod conformer;
pub mod encoder;
pub mod error;
pub mod file_manager;
pub mod platform;
pub mod policy;
pub mod probe;
pub mod progress;
pub mod selector;

pub use config::Config;
pub use conformer::BatchConformer;
pub use error::ConformError;
pub use policy::{EncodingDecision, TargetFileMode};
pub use probe::{FfprobeInspector, MediaInspector};
pub use selector::{select_target, ProbedVideo};
