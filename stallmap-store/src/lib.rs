// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # StallMap Store
//!
//! Everything StallMap keeps on disk.
//!
//! - **Config**: user configuration (`config.json` in the config directory)
//! - **Persistence**: atomic JSON writes and the stall data export
//!
//! ## Usage
//!
//! ```ignore
//! use stallmap_store::{save_stalls, Config};
//!
//! let config = Config::load_from(&Config::default_path())?;
//! let written = save_stalls(&config.output_path, &outcome.stalls).await?;
//! println!("Full data saved → {}", written.display());
//! ```

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{BrowserConfig, Config, DEFAULT_OUTPUT_PATH};
pub use error::StoreError;
pub use persistence::{default_config_dir, load_json, save_json, save_stalls};
