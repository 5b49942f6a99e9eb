//! Canonical serialized design document and its version migrations.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::background::BackgroundDescriptor;
use crate::element::{Element, ElementId, ElementType};
use crate::product::ProductDescriptor;
use crate::validation;
use crate::DesignResult;

/// Schema version written into every captured document.
pub const DESIGN_VERSION: &str = "2.0";

/// A versioned snapshot of product, elements, background and layer state.
///
/// A document is a value: it owns copies of everything it describes, so later
/// edits to the live stores never reach a captured document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    /// Schema version tag.
    pub version: String,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Product the design was made for.
    pub product: ProductDescriptor,
    /// Elements in z-order (front = last).
    pub elements: Vec<Element>,
    /// Background, or `None` for no background.
    pub background: Option<BackgroundDescriptor>,
    /// Selected element.
    pub selected_element_id: Option<ElementId>,
    /// Locked element ids.
    pub locked_elements: BTreeSet<ElementId>,
    /// Hidden element ids.
    pub hidden_elements: BTreeSet<ElementId>,
}

impl DesignDocument {
    /// An empty document for `product`, stamped now with the current version.
    #[must_use]
    pub fn empty(product: ProductDescriptor) -> Self {
        Self {
            version: DESIGN_VERSION.to_string(),
            timestamp: current_timestamp_ms(),
            product,
            elements: Vec::new(),
            background: None,
            selected_element_id: None,
            locked_elements: BTreeSet::new(),
            hidden_elements: BTreeSet::new(),
        }
    }

    /// Normalize geometry of every element. Returns how many were repaired.
    pub fn repair_geometry(&mut self) -> usize {
        self.elements
            .iter_mut()
            .map(Element::normalize)
            .filter(|repaired| *repaired)
            .count()
    }

    /// Short description used in logs and the CLI.
    #[must_use]
    pub fn summary(&self) -> DesignSummary {
        let has = |kind: ElementType| self.elements.iter().any(|e| e.element_type() == kind);
        DesignSummary {
            version: self.version.clone(),
            product: self.product.label(),
            element_count: self.elements.len(),
            has_background: self.background.as_ref().is_some_and(BackgroundDescriptor::is_set),
            has_text: has(ElementType::Text) || has(ElementType::Monogram),
            has_images: has(ElementType::Image),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DesignResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON for file export.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> DesignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse, migrate and validate a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON, migration fails, or the
    /// result does not validate.
    pub fn from_json(json: &str) -> DesignResult<ParsedDocument> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Migrate and validate an untrusted JSON value into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if migration fails or the result does not validate.
    pub fn from_value(value: Value) -> DesignResult<ParsedDocument> {
        let migrated = migrate(value)?;
        validation::validate(&migrated.value)?;
        let document: Self = serde_json::from_value(migrated.value)?;
        Ok(ParsedDocument {
            document,
            source_version: migrated.source_version,
            migrated: migrated.steps > 0,
        })
    }
}

/// A document read from untrusted input, with its version history.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// The validated document.
    pub document: DesignDocument,
    /// Version tag found in the input.
    pub source_version: String,
    /// Whether migration steps were applied.
    pub migrated: bool,
}

impl ParsedDocument {
    /// Whether the input was written under a different schema version.
    #[must_use]
    pub fn version_mismatch(&self) -> bool {
        self.source_version != DESIGN_VERSION
    }
}

/// Counts and flags describing a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSummary {
    /// Schema version.
    pub version: String,
    /// Product label.
    pub product: String,
    /// Number of elements.
    pub element_count: usize,
    /// Whether a visible background is set.
    pub has_background: bool,
    /// Whether any text or monogram is present.
    pub has_text: bool,
    /// Whether any image is present.
    pub has_images: bool,
}

// ---------------------------------------------------------------------------
// Migration
// ---------------------------------------------------------------------------

type MigrationStep = fn(&mut Map<String, Value>);

/// Registered upgrade steps as `(from, to, step)`.
const MIGRATIONS: &[(&str, &str, MigrationStep)] = &[("1.0", "2.0", migrate_v1_to_v2)];

/// Outcome of running the migration chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOutcome {
    /// The upgraded value.
    pub value: Value,
    /// Version tag before migration.
    pub source_version: String,
    /// Number of steps applied.
    pub steps: usize,
}

/// Upgrade a raw document to [`DESIGN_VERSION`] through the registered steps.
///
/// Documents at an unknown version are returned untouched; the caller decides
/// what to do with the mismatch.
///
/// # Errors
///
/// Returns a validation error if the value is not an object or has no string
/// `version`.
pub fn migrate(mut value: Value) -> Result<MigrationOutcome, validation::ValidationError> {
    let object = value
        .as_object_mut()
        .ok_or_else(|| validation::ValidationError::WrongType {
            path: "/".to_string(),
            expected: "object",
        })?;
    let source_version = object
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| validation::ValidationError::Missing {
            path: "/version".to_string(),
        })?
        .to_string();

    let mut version = source_version.clone();
    let mut steps = 0;
    while version != DESIGN_VERSION {
        let Some((_, to, step)) = MIGRATIONS.iter().find(|(from, _, _)| *from == version) else {
            tracing::warn!(
                saved = %source_version,
                current = DESIGN_VERSION,
                "No migration path; using document as-is"
            );
            break;
        };
        step(object);
        object.insert("version".to_string(), Value::String((*to).to_string()));
        tracing::debug!(from = %version, to = %to, "Migrated design document");
        version = (*to).to_string();
        steps += 1;
    }

    Ok(MigrationOutcome {
        value,
        source_version,
        steps,
    })
}

/// 1.0 documents kept lock/visibility flags in a `layerStack` array.
fn migrate_v1_to_v2(doc: &mut Map<String, Value>) {
    let layers = match doc.remove("layerStack") {
        Some(Value::Array(layers)) => layers,
        _ => Vec::new(),
    };
    let ids_where = |flag: &str, expected: bool| -> Value {
        layers
            .iter()
            .filter(|layer| layer.get(flag).and_then(Value::as_bool) == Some(expected))
            .filter_map(|layer| layer.get("id").cloned())
            .collect()
    };

    if !doc.contains_key("lockedElements") {
        doc.insert("lockedElements".to_string(), ids_where("locked", true));
    }
    if !doc.contains_key("hiddenElements") {
        doc.insert("hiddenElements".to_string(), ids_where("visible", false));
    }
    doc.entry("selectedElementId").or_insert(Value::Null);
    doc.entry("background").or_insert(Value::Null);
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
