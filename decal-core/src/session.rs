//! The design session: live stores plus capture, restore and persistence.
//!
//! A [`DesignSession`] owns the product, background and element stores of one
//! editor. It captures them into a [`DesignDocument`], restores them from one,
//! and moves documents to and from durable storage, share links and files.
//!
//! Restoring never leaves half-applied state. The incoming document is
//! repaired and validated, the complete new state is built in a staging value
//! (product first, then background, elements, selection, lock and visibility
//! sets), and only then swapped into the live stores.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::background::BackgroundStore;
use crate::collection::ElementCollection;
use crate::config::DesignConfig;
use crate::document::{current_timestamp_ms, DesignDocument, ParsedDocument, DESIGN_VERSION};
use crate::fingerprint::{content_hash, ContentHash};
use crate::preview::{PreviewImage, PreviewOptions, PreviewRenderer};
use crate::product::{ProductDescriptor, ProductStore};
use crate::resize::{rescale, ResizeFactors};
use crate::share;
use crate::storage::{DesignStorage, MemoryStorage};
use crate::validation;
use crate::{DesignError, DesignResult};

/// A session shared between the editor and background tasks.
pub type SharedSession = Arc<Mutex<DesignSession>>;

/// A design read back from storage, a file or a link.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDesign {
    /// The restored document.
    pub document: DesignDocument,
    /// Version tag found in the input.
    pub source_version: String,
    /// Whether migration steps were applied.
    pub migrated: bool,
    /// Whether the input was written under a different schema version.
    pub version_mismatch: bool,
}

impl From<ParsedDocument> for LoadedDesign {
    fn from(parsed: ParsedDocument) -> Self {
        let version_mismatch = parsed.version_mismatch();
        Self {
            document: parsed.document,
            source_version: parsed.source_version,
            migrated: parsed.migrated,
            version_mismatch,
        }
    }
}

/// Complete store state built before a restore is committed.
struct StagedState {
    product: ProductStore,
    background: BackgroundStore,
    elements: ElementCollection,
}

impl StagedState {
    fn build(document: &DesignDocument) -> DesignResult<Self> {
        let product = ProductStore::new(document.product.clone());

        let mut background = BackgroundStore::new();
        background.apply(document.background.as_ref());

        let mut elements = ElementCollection::new();
        for element in &document.elements {
            elements.add(element.clone())?;
        }

        match &document.selected_element_id {
            Some(id) if elements.contains(id) => elements.select(id)?,
            Some(id) => {
                tracing::warn!(id = %id, "Selected element not in document; clearing selection");
                elements.deselect();
            }
            None => elements.deselect(),
        }

        elements.set_locked(document.locked_elements.iter().cloned());
        elements.set_hidden(document.hidden_elements.iter().cloned());

        Ok(Self {
            product,
            background,
            elements,
        })
    }
}

/// Live editor state and its persistence.
#[derive(Debug)]
pub struct DesignSession {
    product: ProductStore,
    background: BackgroundStore,
    elements: ElementCollection,
    storage: Box<dyn DesignStorage>,
    config: DesignConfig,
    renderer: Option<Box<dyn PreviewRenderer>>,
    /// Fingerprint of the last saved or restored state.
    baseline: Option<ContentHash>,
    unsaved: bool,
    /// Timestamp of the last successful save or load, in ms.
    last_save: Option<u64>,
}

impl DesignSession {
    /// Create a session over `storage` with the default product.
    pub fn new(storage: impl DesignStorage + 'static, config: DesignConfig) -> Self {
        Self {
            product: ProductStore::default(),
            background: BackgroundStore::new(),
            elements: ElementCollection::new(),
            storage: Box::new(storage),
            config,
            renderer: None,
            baseline: None,
            unsaved: false,
            last_save: None,
        }
    }

    /// A session backed by fresh in-memory storage and default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), DesignConfig::default())
    }

    /// Start on `product` instead of the default.
    #[must_use]
    pub fn with_product(mut self, product: ProductDescriptor) -> Self {
        self.product.set_product(product);
        self
    }

    /// Attach a preview renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl PreviewRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Wrap the session for sharing with an autosave task.
    #[must_use]
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // -----------------------------------------------------------------------
    // Stores
    // -----------------------------------------------------------------------

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &DesignConfig {
        &self.config
    }

    /// The active product.
    #[must_use]
    pub fn product(&self) -> &ProductDescriptor {
        self.product.current()
    }

    /// The background store.
    #[must_use]
    pub fn background(&self) -> &BackgroundStore {
        &self.background
    }

    /// Mutable background store. Marks the design as changed.
    pub fn background_mut(&mut self) -> &mut BackgroundStore {
        self.unsaved = true;
        &mut self.background
    }

    /// The element collection.
    #[must_use]
    pub fn elements(&self) -> &ElementCollection {
        &self.elements
    }

    /// Mutable element collection. Marks the design as changed.
    pub fn elements_mut(&mut self) -> &mut ElementCollection {
        self.unsaved = true;
        &mut self.elements
    }

    // -----------------------------------------------------------------------
    // Capture and restore
    // -----------------------------------------------------------------------

    /// Snapshot the live stores into a new document stamped now.
    #[must_use]
    pub fn capture(&self) -> DesignDocument {
        let background = self.background.current();
        DesignDocument {
            version: DESIGN_VERSION.to_string(),
            timestamp: current_timestamp_ms(),
            product: self.product.current().clone(),
            elements: self.elements.elements().to_vec(),
            background: background.is_set().then(|| background.clone()),
            selected_element_id: self.elements.selected_id().cloned(),
            locked_elements: self.elements.locked().clone(),
            hidden_elements: self.elements.hidden().clone(),
        }
    }

    /// Replace the live state with `document`.
    ///
    /// Geometry is repaired first, then the document is validated. Nothing is
    /// changed if either validation or staging fails.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Validation`] for a malformed document, or
    /// [`DesignError::InvalidOperation`] if it repeats an element id.
    pub fn try_restore(&mut self, document: &DesignDocument) -> DesignResult<()> {
        let mut document = document.clone();
        let repaired = document.repair_geometry();
        if repaired > 0 {
            tracing::debug!(repaired, "Repaired element geometry before restore");
        }
        validation::validate_document(&document)?;

        let staged = StagedState::build(&document)?;
        self.product = staged.product;
        self.background = staged.background;
        self.elements = staged.elements;

        self.reset_baseline();
        tracing::info!(
            version = %document.version,
            product = %document.product.label(),
            elements = document.elements.len(),
            "Design restored"
        );
        Ok(())
    }

    /// Restore, logging and swallowing any failure.
    pub fn restore(&mut self, document: &DesignDocument) -> bool {
        match self.try_restore(document) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Design restore rejected");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Change detection
    // -----------------------------------------------------------------------

    /// Whether the live design differs from the last saved or restored one.
    ///
    /// An empty design never counts as changed.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        if self.elements.is_empty() {
            return false;
        }
        match content_hash(&self.capture()) {
            Ok(hash) => self.baseline != Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fingerprint design");
                true
            }
        }
    }

    /// Flag the design as edited.
    pub fn mark_changed(&mut self) {
        self.unsaved = true;
    }

    /// Whether edits were made since the last save or restore.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved || self.has_changed()
    }

    fn reset_baseline(&mut self) {
        self.baseline = match content_hash(&self.capture()) {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fingerprint design");
                None
            }
        };
        self.unsaved = false;
    }

    // -----------------------------------------------------------------------
    // Durable storage
    // -----------------------------------------------------------------------

    /// Save the design under the configured key if it changed.
    ///
    /// Returns `Ok(true)` if a blob was written, `Ok(false)` if the design
    /// was empty or unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture does not validate or cannot be
    /// written. The previously stored blob is left in place.
    pub fn try_save(&mut self) -> DesignResult<bool> {
        if self.elements.is_empty() {
            tracing::debug!("Design is empty; not saving");
            return Ok(false);
        }

        let document = self.capture();
        let hash = content_hash(&document)?;
        if self.baseline == Some(hash) {
            tracing::debug!("Design unchanged; not saving");
            return Ok(false);
        }
        self.write_document(&document, hash)?;
        Ok(true)
    }

    /// Write the design under the configured key even if it is unchanged.
    ///
    /// Used after importing or opening a link, where the restored design
    /// matches the baseline but is not yet stored. Empty designs are still
    /// never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture does not validate or cannot be
    /// written.
    pub fn try_persist(&mut self) -> DesignResult<bool> {
        if self.elements.is_empty() {
            tracing::debug!("Design is empty; not saving");
            return Ok(false);
        }
        let document = self.capture();
        let hash = content_hash(&document)?;
        self.write_document(&document, hash)?;
        Ok(true)
    }

    fn write_document(&mut self, document: &DesignDocument, hash: ContentHash) -> DesignResult<()> {
        validation::validate_document(document)?;
        let json = document.to_json()?;
        self.storage.set(&self.config.storage_key, &json)?;

        self.baseline = Some(hash);
        self.unsaved = false;
        self.last_save = Some(document.timestamp);
        tracing::info!(
            key = %self.config.storage_key,
            elements = document.elements.len(),
            bytes = json.len(),
            "Design saved"
        );
        Ok(())
    }

    /// Save, returning `true` on success or when there was nothing to save.
    pub fn save(&mut self) -> bool {
        match self.try_save() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, key = %self.config.storage_key, "Failed to save design");
                false
            }
        }
    }

    /// Load and restore the design stored under the configured key.
    ///
    /// A blob that cannot be parsed, validated or restored is erased.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the backend cannot be read, or the
    /// document error that caused the blob to be erased.
    pub fn try_load(&mut self) -> DesignResult<Option<LoadedDesign>> {
        let key = self.config.storage_key.clone();
        let Some(json) = self.storage.get(&key)? else {
            tracing::debug!(key = %key, "No saved design");
            return Ok(None);
        };

        let outcome = DesignDocument::from_json(&json).and_then(|parsed| {
            self.try_restore(&parsed.document)?;
            Ok(LoadedDesign::from(parsed))
        });

        match outcome {
            Ok(loaded) => {
                if loaded.version_mismatch {
                    tracing::warn!(
                        saved = %loaded.source_version,
                        current = DESIGN_VERSION,
                        migrated = loaded.migrated,
                        "Saved design was written by a different version"
                    );
                }
                self.last_save = Some(loaded.document.timestamp);
                Ok(Some(loaded))
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Saved design is corrupt; erasing");
                if let Err(remove_err) = self.storage.remove(&key) {
                    tracing::warn!(error = %remove_err, key = %key, "Failed to erase corrupt design");
                }
                Err(e)
            }
        }
    }

    /// Load, logging any failure.
    pub fn load(&mut self) -> Option<LoadedDesign> {
        self.try_load().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Load produced no design");
            None
        })
    }

    /// Remove the stored design and forget the baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    pub fn clear_storage(&mut self) -> DesignResult<()> {
        self.storage.remove(&self.config.storage_key)?;
        self.baseline = None;
        self.unsaved = false;
        tracing::debug!(key = %self.config.storage_key, "Cleared saved design");
        Ok(())
    }

    /// Timestamp of the last save or load in ms since the epoch.
    #[must_use]
    pub fn last_save_time(&self) -> Option<u64> {
        self.last_save
    }

    /// Human-readable age of the last save, e.g. `5m ago`.
    #[must_use]
    pub fn time_since_last_save(&self) -> Option<String> {
        self.last_save
            .map(|saved| describe_elapsed(current_timestamp_ms().saturating_sub(saved)))
    }

    /// Start over: empty collection, no background, nothing stored.
    pub fn new_design(&mut self) {
        self.elements.clear();
        self.background.clear();
        if let Err(e) = self.storage.remove(&self.config.storage_key) {
            tracing::warn!(error = %e, "Failed to clear saved design");
        }
        self.baseline = None;
        self.unsaved = false;
        self.last_save = None;
        tracing::info!("Started new design");
    }

    // -----------------------------------------------------------------------
    // Share links
    // -----------------------------------------------------------------------

    /// Build a share link for the live design on `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture does not validate, cannot be encoded,
    /// or `base_url` is not a URL.
    pub fn try_share_link(&self, base_url: &str) -> DesignResult<String> {
        let document = self.capture();
        validation::validate_document(&document)?;
        let payload = share::encode_payload(&document)?;
        share::compose_link(base_url, &self.config.share_param, &payload)
    }

    /// Build a share link, logging any failure.
    #[must_use]
    pub fn share_link(&self, base_url: &str) -> Option<String> {
        match self.try_share_link(base_url) {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build share link");
                None
            }
        }
    }

    /// Restore the design carried by a share link.
    ///
    /// The opened design becomes the change-detection baseline.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Decode`] if the link carries no usable payload,
    /// or the restore error.
    pub fn try_open_link(&mut self, link: &str) -> DesignResult<()> {
        let payload = share::extract_param(link, &self.config.share_param)?;
        let document = share::try_decode_payload(&payload)?;
        self.try_restore(&document)?;
        Ok(())
    }

    /// Open a share link, logging any failure.
    pub fn open_link(&mut self, link: &str) -> bool {
        match self.try_open_link(link) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open share link");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // File export and import
    // -----------------------------------------------------------------------

    /// The live design as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture does not validate.
    pub fn export_json(&self) -> DesignResult<String> {
        let document = self.capture();
        validation::validate_document(&document)?;
        document.to_json_pretty()
    }

    /// Write the live design to `dir/decal-design-<timestamp>.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture does not validate or the file cannot
    /// be written.
    pub fn export_to_dir(&self, dir: &Path) -> DesignResult<PathBuf> {
        let document = self.capture();
        validation::validate_document(&document)?;
        let path = dir.join(format!("decal-design-{}.json", document.timestamp));
        std::fs::write(&path, document.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), "Design exported");
        Ok(path)
    }

    /// Parse, migrate, validate and restore a JSON design.
    ///
    /// The imported design becomes the change-detection baseline.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid design.
    pub fn try_import_json(&mut self, json: &str) -> DesignResult<LoadedDesign> {
        let parsed = DesignDocument::from_json(json)?;
        self.try_restore(&parsed.document)?;
        let loaded = LoadedDesign::from(parsed);
        if loaded.version_mismatch {
            tracing::warn!(
                source = %loaded.source_version,
                current = DESIGN_VERSION,
                "Imported design was written by a different version"
            );
        }
        Ok(loaded)
    }

    /// Import JSON, logging any failure.
    pub fn import_json(&mut self, json: &str) -> bool {
        match self.try_import_json(json) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to import design");
                false
            }
        }
    }

    /// Import a design file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid design.
    pub fn try_import_file(&mut self, path: &Path) -> DesignResult<LoadedDesign> {
        let json = std::fs::read_to_string(path)?;
        self.try_import_json(&json)
    }

    /// Import a design file, logging any failure.
    pub fn import_file(&mut self, path: &Path) -> bool {
        match self.try_import_file(path) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to import design file");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Product
    // -----------------------------------------------------------------------

    /// Whether the live design fits `product` without shrinking.
    #[must_use]
    pub fn design_fits(&self, product: &ProductDescriptor) -> bool {
        product.contains(self.product.current())
    }

    /// Rescale every element onto `product` and make it active.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] if the active product has a
    /// zero dimension. The active product is unchanged in that case.
    pub fn switch_product(&mut self, product: ProductDescriptor) -> DesignResult<ResizeFactors> {
        let old = self.product.current().clone();
        let factors = rescale(&old, &product, &mut self.elements)?;
        self.product.set_product(product);
        self.unsaved = true;
        Ok(factors)
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------

    /// Render the live design through the attached renderer.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::PreviewUnavailable`] without a renderer, or the
    /// renderer's error.
    pub fn preview(&self, options: &PreviewOptions) -> DesignResult<PreviewImage> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or(DesignError::PreviewUnavailable)?;
        let mut document = self.capture();
        if options.skip_hidden {
            let hidden = &document.hidden_elements;
            document.elements.retain(|e| !hidden.contains(&e.id));
        }
        renderer.render(&document, options)
    }
}

/// Format an elapsed time in ms as `Just now`, `<n>m ago` or `<n>h ago`.
#[must_use]
pub fn describe_elapsed(elapsed_ms: u64) -> String {
    let minutes = elapsed_ms / 60_000;
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else {
        format!("{}h ago", minutes / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementId};
    use crate::preview::PreviewFormat;

    #[derive(Debug)]
    struct SolidRenderer;

    impl PreviewRenderer for SolidRenderer {
        fn render(&self, document: &DesignDocument, _options: &PreviewOptions) -> DesignResult<PreviewImage> {
            Ok(PreviewImage {
                format: PreviewFormat::Png,
                width: document.product.width,
                height: document.product.height,
                bytes: vec![0; document.elements.len()],
            })
        }
    }

    #[test]
    fn test_describe_elapsed() {
        assert_eq!(describe_elapsed(0), "Just now");
        assert_eq!(describe_elapsed(59_999), "Just now");
        assert_eq!(describe_elapsed(5 * 60_000), "5m ago");
        assert_eq!(describe_elapsed(59 * 60_000), "59m ago");
        assert_eq!(describe_elapsed(3 * 3_600_000 + 10), "3h ago");
    }

    #[test]
    fn test_capture_omits_unset_background() {
        let mut session = DesignSession::in_memory();
        assert!(session.capture().background.is_none());

        session.background_mut().set_solid_color("#123456", false);
        let captured = session.capture();
        assert_eq!(
            captured.background.and_then(|bg| bg.solid_color).as_deref(),
            Some("#123456")
        );
    }

    #[test]
    fn test_capture_is_a_copy() {
        let mut session = DesignSession::in_memory();
        let id = session
            .elements_mut()
            .add(Element::text("before", 0.0, 0.0))
            .expect("add");
        let captured = session.capture();

        session
            .elements_mut()
            .update(&id, |e| e.rotation = 90.0)
            .expect("update");
        assert!(captured.elements[0].rotation.abs() < f64::EPSILON);
        assert_eq!(captured.selected_element_id, Some(id));
    }

    #[test]
    fn test_dangling_selection_cleared() {
        let mut session = DesignSession::in_memory();
        let mut document = DesignDocument::empty(ProductDescriptor::default());
        document.elements.push(Element::emoji("⭐"));
        document.selected_element_id = Some(ElementId::from("gone"));

        session.try_restore(&document).expect("restore");
        assert!(session.elements().selected_id().is_none());
        assert!(!session.has_changed());
    }

    #[test]
    fn test_restore_rejects_duplicate_ids() {
        let mut session = DesignSession::in_memory();
        session
            .elements_mut()
            .add(Element::image("keep.png"))
            .expect("add");

        let mut document = DesignDocument::empty(ProductDescriptor::new("walrus", "24oz", 10, 10));
        let element = Element::image("a.png");
        document.elements.push(element.clone());
        document.elements.push(element);

        assert!(!session.restore(&document));
        assert_eq!(session.elements().len(), 1);
        assert_eq!(session.product(), &ProductDescriptor::default());
    }

    #[test]
    fn test_restore_repairs_geometry() {
        let mut session = DesignSession::in_memory();
        let mut document = DesignDocument::empty(ProductDescriptor::default());
        document
            .elements
            .push(Element::image("a.png").with_position(f64::NAN, 3.0).with_scale(-2.0));

        session.try_restore(&document).expect("restore");
        let element = &session.elements().elements()[0];
        assert!((element.position.x - 100.0).abs() < f64::EPSILON);
        assert!((element.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mark_changed_and_save_resets() {
        let mut session = DesignSession::in_memory();
        assert!(!session.has_unsaved_changes());

        session.mark_changed();
        assert!(session.has_unsaved_changes());

        session
            .elements_mut()
            .add(Element::text("x", 0.0, 0.0))
            .expect("add");
        assert!(session.save());
        assert!(!session.has_unsaved_changes());
        assert_eq!(session.time_since_last_save().as_deref(), Some("Just now"));
    }

    #[test]
    fn test_switch_product_and_fit() {
        let mut session = DesignSession::in_memory()
            .with_product(ProductDescriptor::new("bandit", "16oz", 400, 300));
        session
            .elements_mut()
            .add(Element::image("a.png").with_position(100.0, 100.0))
            .expect("add");

        let larger = ProductDescriptor::new("bandit", "32oz", 800, 600);
        let smaller = ProductDescriptor::new("bandit", "8oz", 200, 300);
        assert!(session.design_fits(&larger));
        assert!(!session.design_fits(&smaller));

        let factors = session.switch_product(larger.clone()).expect("switch");
        assert!((factors.average() - 2.0).abs() < f64::EPSILON);
        assert_eq!(session.product(), &larger);
        assert!((session.elements().elements()[0].position.y - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preview_requires_renderer() {
        let session = DesignSession::in_memory();
        assert!(matches!(
            session.preview(&PreviewOptions::default()),
            Err(DesignError::PreviewUnavailable)
        ));

        let session = DesignSession::in_memory().with_renderer(SolidRenderer);
        let image = session.preview(&PreviewOptions::default()).expect("preview");
        assert_eq!((image.width, image.height), (800, 600));
    }

    #[test]
    fn test_preview_skips_hidden_elements() {
        let mut session = DesignSession::in_memory().with_renderer(SolidRenderer);
        let hidden = session
            .elements_mut()
            .add(Element::text("hidden", 0.0, 0.0))
            .expect("add");
        session
            .elements_mut()
            .add(Element::emoji("🎈"))
            .expect("add");
        session.elements_mut().hide(&hidden);

        let image = session.preview(&PreviewOptions::default()).expect("preview");
        assert_eq!(image.bytes.len(), 1);

        let all = PreviewOptions {
            skip_hidden: false,
            ..PreviewOptions::default()
        };
        assert_eq!(session.preview(&all).expect("preview").bytes.len(), 2);
    }

    #[test]
    fn test_new_design_clears_everything() {
        let storage = MemoryStorage::new();
        let mut session = DesignSession::new(storage.clone(), DesignConfig::default());
        session
            .elements_mut()
            .add(Element::text("x", 0.0, 0.0))
            .expect("add");
        session.background_mut().set_image("https://example.com/bg.png");
        assert!(session.save());
        assert!(storage.contains("decal_design_autosave"));

        session.new_design();
        assert!(session.elements().is_empty());
        assert!(!session.background().current().is_set());
        assert!(!storage.contains("decal_design_autosave"));
        assert!(session.last_save_time().is_none());
    }
}
