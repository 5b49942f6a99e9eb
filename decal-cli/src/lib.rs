//! # Decal CLI
//!
//! Command-line host for the Decal design engine. Works against a data
//! directory holding the autosaved design and against exported design files.
//!
//! ## Usage
//!
//! ```bash
//! decal import my-design.json
//! decal inspect
//! decal share --base-url https://shop.example.com/customize
//! decal resize --width 1024 --height 768
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `Command` - One variant per subcommand
//! - `run` - Executes a command and returns the text to print

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use decal_core::config::{DEFAULT_DATA_DIR, DEFAULT_SHARE_BASE_URL};
use decal_core::storage::DEFAULT_STORAGE_KEY;
use decal_core::{
    content_hash, DesignConfig, DesignDocument, DesignSession, DesignSummary, FileStorage,
    LoadedDesign, ProductDescriptor,
};
use serde::Serialize;

/// Command-line arguments for decal.
#[derive(Debug, Clone, Parser)]
#[command(name = "decal")]
#[command(about = "Inspect, import, export, share and resize saved designs")]
#[command(version)]
pub struct CliArgs {
    /// Directory holding the saved design
    #[arg(long, env = "DECAL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Storage key of the saved design
    #[arg(long, env = "DECAL_STORAGE_KEY", default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Summarize a design file, or the saved design when no file is given
    Inspect {
        /// Design file to inspect
        file: Option<PathBuf>,
    },
    /// Import a design file and save it
    Import {
        /// Design file to import
        file: PathBuf,
    },
    /// Export the saved design as JSON
    Export {
        /// Directory to write `decal-design-<timestamp>.json` into; stdout if absent
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a share link for the saved design
    Share {
        /// Page the link opens
        #[arg(long, env = "DECAL_SHARE_BASE_URL", default_value = DEFAULT_SHARE_BASE_URL)]
        base_url: String,
    },
    /// Restore the design carried by a share link and save it
    OpenLink {
        /// Share link
        url: String,
    },
    /// Rescale the saved design onto a product with new canvas bounds
    Resize {
        /// New canvas width in pixels
        #[arg(long)]
        width: u32,
        /// New canvas height in pixels
        #[arg(long)]
        height: u32,
        /// New product type (defaults to the current one)
        #[arg(long = "type")]
        product_type: Option<String>,
        /// New product size (defaults to the current one)
        #[arg(long)]
        size: Option<String>,
    },
    /// Discard the saved design
    New,
}

impl CliArgs {
    /// Session configuration from the environment, overridden by flags.
    #[must_use]
    pub fn config(&self) -> DesignConfig {
        let mut config = DesignConfig::from_env()
            .with_storage_key(self.storage_key.clone())
            .with_data_dir(self.data_dir.clone());
        if let Command::Share { base_url } = &self.command {
            config = config.with_share_base_url(base_url.clone());
        }
        config
    }
}

/// Report printed by `inspect`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectReport {
    #[serde(flatten)]
    summary: DesignSummary,
    source_version: String,
    migrated: bool,
    version_mismatch: bool,
    content_hash: String,
}

impl InspectReport {
    fn new(loaded: &LoadedDesign) -> anyhow::Result<Self> {
        Ok(Self {
            summary: loaded.document.summary(),
            source_version: loaded.source_version.clone(),
            migrated: loaded.migrated,
            version_mismatch: loaded.version_mismatch,
            content_hash: content_hash(&loaded.document)?.to_string(),
        })
    }
}

/// Run a command. Returns the text to print on stdout.
///
/// # Errors
///
/// Returns an error if storage cannot be opened, no design is saved when one
/// is needed, or the design engine rejects the input.
pub fn run(args: &CliArgs) -> anyhow::Result<String> {
    let config = args.config();
    let storage = FileStorage::new(&config.data_dir)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;
    let mut session = DesignSession::new(storage, config);

    match &args.command {
        Command::Inspect { file } => inspect(&mut session, file.as_deref()),
        Command::Import { file } => {
            let loaded = session
                .try_import_file(file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            session.try_persist().context("Failed to save imported design")?;
            let mut message = format!(
                "Imported {} element(s) for {}",
                loaded.document.elements.len(),
                loaded.document.product.label()
            );
            if loaded.version_mismatch {
                message.push_str(&format!(" (migrated from version {})", loaded.source_version));
            }
            Ok(message)
        }
        Command::Export { out } => {
            load_saved(&mut session)?;
            match out {
                Some(dir) => {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create {}", dir.display()))?;
                    let path = session.export_to_dir(dir)?;
                    Ok(path.display().to_string())
                }
                None => Ok(session.export_json()?),
            }
        }
        Command::Share { .. } => {
            load_saved(&mut session)?;
            let base_url = session.config().share_base_url.clone();
            Ok(session.try_share_link(&base_url)?)
        }
        Command::OpenLink { url } => {
            session.try_open_link(url).context("Failed to open share link")?;
            session.try_persist().context("Failed to save opened design")?;
            Ok(format!(
                "Opened design with {} element(s) for {}",
                session.elements().len(),
                session.product().label()
            ))
        }
        Command::Resize {
            width,
            height,
            product_type,
            size,
        } => {
            load_saved(&mut session)?;
            let current = session.product().clone();
            let target = ProductDescriptor::new(
                product_type.as_deref().unwrap_or(&current.product_type),
                size.as_deref().unwrap_or(&current.size),
                *width,
                *height,
            );
            let fits = session.design_fits(&target);
            let factors = session.switch_product(target)?;
            session.try_save().context("Failed to save resized design")?;
            Ok(format!(
                "Resized {} -> {} (sx={:.3}, sy={:.3}{})",
                current.label(),
                session.product().label(),
                factors.sx,
                factors.sy,
                if fits { "" } else { ", design was shrunk" }
            ))
        }
        Command::New => {
            session.new_design();
            Ok("Cleared saved design".to_string())
        }
    }
}

fn inspect(session: &mut DesignSession, file: Option<&Path>) -> anyhow::Result<String> {
    let loaded = match file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            LoadedDesign::from(DesignDocument::from_json(&json)?)
        }
        None => load_saved(session)?,
    };
    Ok(serde_json::to_string_pretty(&InspectReport::new(&loaded)?)?)
}

fn load_saved(session: &mut DesignSession) -> anyhow::Result<LoadedDesign> {
    match session.try_load()? {
        Some(loaded) => Ok(loaded),
        None => bail!(
            "No saved design under key '{}'",
            session.config().storage_key
        ),
    }
}
