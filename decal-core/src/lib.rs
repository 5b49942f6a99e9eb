//! # Decal Core
//!
//! Design document engine for product-customization editors.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  DesignSession                   │
//! ├──────────────────────────────────────────────────┤
//! │  Stores              │  Pipeline                 │
//! │  - ProductStore      │  - capture / restore      │
//! │  - BackgroundStore   │  - validate / migrate     │
//! │  - ElementCollection │  - fingerprint            │
//! ├──────────────────────────────────────────────────┤
//! │  Persistence         │  Transforms               │
//! │  - DesignStorage     │  - product rescale        │
//! │  - share links       │  - autosave scheduler     │
//! │  - file import/export│                           │
//! └──────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autosave;
pub mod background;
pub mod collection;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod fingerprint;
pub mod preview;
pub mod product;
pub mod resize;
pub mod session;
pub mod share;
pub mod storage;
pub mod validation;

pub use autosave::AutosaveScheduler;
pub use background::{BackgroundDescriptor, BackgroundStore, BackgroundType};
pub use collection::{Alignment, ElementCollection};
pub use config::DesignConfig;
pub use document::{DesignDocument, DesignSummary, ParsedDocument, DESIGN_VERSION};
pub use element::{
    Element, ElementId, ElementKind, ElementType, MonogramLetters, Position, TextStyle,
};
pub use error::{DesignError, DesignResult};
pub use fingerprint::{content_hash, ContentHash};
pub use preview::{PreviewFormat, PreviewImage, PreviewOptions, PreviewRenderer};
pub use product::{ProductDescriptor, ProductStore};
pub use resize::{rescale, ResizeFactors};
pub use session::{DesignSession, LoadedDesign, SharedSession};
pub use share::{decode_payload, encode_payload};
pub use storage::{DesignStorage, FileStorage, MemoryStorage};
pub use validation::{is_valid, validate, ValidationError};

/// Decal core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
