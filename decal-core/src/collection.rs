//! Ordered element collection with selection, lock and visibility state.
//!
//! The order of [`ElementCollection::elements`] is the z-order: index 0 is
//! drawn first (back), the last element is drawn on top (front).

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::element::{Element, ElementId, ElementKind};
use crate::{DesignError, DesignResult};

/// Offset applied to duplicated elements, in pixels.
const DUPLICATE_OFFSET: f64 = 20.0;

/// Alignment of the selected element against the canvas bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Flush with the left edge.
    Left,
    /// Horizontally centered.
    Center,
    /// Flush with the right edge.
    Right,
    /// Flush with the top edge.
    Top,
    /// Vertically centered.
    Middle,
    /// Flush with the bottom edge.
    Bottom,
}

/// The live set of placed elements.
#[derive(Debug, Clone, Default)]
pub struct ElementCollection {
    /// Elements in z-order (front = last).
    elements: Vec<Element>,
    /// Currently selected element.
    selected: Option<ElementId>,
    /// Elements that refuse deletion.
    locked: BTreeSet<ElementId>,
    /// Elements excluded from rendering.
    hidden: BTreeSet<ElementId>,
}

impl ElementCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element on top of the stack and select it.
    ///
    /// Unusable geometry is replaced with defaults before insertion.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] if an element with the same
    /// id is already present.
    pub fn add(&mut self, mut element: Element) -> DesignResult<ElementId> {
        if self.contains(&element.id) {
            return Err(DesignError::InvalidOperation(format!(
                "duplicate element id {}",
                element.id
            )));
        }
        if element.normalize() {
            tracing::debug!(id = %element.id, "Repaired element geometry on insert");
        }
        let id = element.id.clone();
        self.elements.push(element);
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Update an element in place through a closure.
    ///
    /// The element id cannot be changed this way, and geometry is normalized
    /// after the closure runs.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn update<F>(&mut self, id: &ElementId, f: F) -> DesignResult<()>
    where
        F: FnOnce(&mut Element),
    {
        let element = self
            .elements
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        f(element);
        element.id = id.clone();
        element.normalize();
        Ok(())
    }

    /// Shallow-merge a JSON patch into an element.
    ///
    /// Top-level keys of `patch` replace the element's fields; `id` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist,
    /// or [`DesignError::Serialization`] if the merged value is not a valid
    /// element.
    pub fn apply_patch(&mut self, id: &ElementId, patch: &Map<String, Value>) -> DesignResult<()> {
        let current = self
            .get(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;

        let mut merged = match serde_json::to_value(current)? {
            Value::Object(map) => map,
            _ => return Err(DesignError::InvalidOperation("element is not an object".into())),
        };
        for (key, value) in patch {
            if key != "id" {
                merged.insert(key.clone(), value.clone());
            }
        }
        let patched: Element = serde_json::from_value(Value::Object(merged))?;

        self.update(id, |element| *element = patched)
    }

    /// Remove an element.
    ///
    /// Clears the selection if the element was selected.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementLocked`] if the element is locked, or
    /// [`DesignError::ElementNotFound`] if it does not exist.
    pub fn remove(&mut self, id: &ElementId) -> DesignResult<Element> {
        if self.locked.contains(id) {
            tracing::warn!(id = %id, "Refusing to delete locked element");
            return Err(DesignError::ElementLocked(id.to_string()));
        }
        let index = self
            .index_of(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let removed = self.elements.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.locked.remove(id);
        Ok(removed)
    }

    /// Remove every element, the selection, and all lock/visibility state.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.locked.clear();
        self.hidden.clear();
    }

    /// Copy an element under a new id, offset down and right, and select it.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the source does not exist.
    pub fn duplicate(&mut self, id: &ElementId) -> DesignResult<ElementId> {
        let source = self
            .get(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let mut copy = source.clone();
        copy.id = ElementId::generate(copy.element_type());
        copy.position.x += DUPLICATE_OFFSET;
        copy.position.y += DUPLICATE_OFFSET;
        self.add(copy)
    }

    /// Get an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Whether an element with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Position of an element in z-order.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// All elements in z-order (back to front).
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Elements that are not hidden, back to front.
    pub fn visible_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| !self.hidden.contains(&e.id))
    }

    /// Elements that are not locked, back to front.
    pub fn unlocked_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| !self.locked.contains(&e.id))
    }

    /// Elements front to back, as listed in a layers panel.
    pub fn layered_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().rev()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select an element.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn select(&mut self, id: &ElementId) -> DesignResult<()> {
        if !self.contains(id) {
            return Err(DesignError::ElementNotFound(id.to_string()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Id of the selected element.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    // -----------------------------------------------------------------------
    // Reordering
    // -----------------------------------------------------------------------

    /// Move an element to `index` in z-order, clamped to the last slot.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn move_to_index(&mut self, id: &ElementId, index: usize) -> DesignResult<()> {
        let current = self
            .index_of(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        let element = self.elements.remove(current);
        let target = index.min(self.elements.len());
        self.elements.insert(target, element);
        Ok(())
    }

    /// Move an element to the front.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn bring_to_front(&mut self, id: &ElementId) -> DesignResult<()> {
        let last = self.elements.len().saturating_sub(1);
        self.move_to_index(id, last)
    }

    /// Move an element to the back.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn send_to_back(&mut self, id: &ElementId) -> DesignResult<()> {
        self.move_to_index(id, 0)
    }

    /// Move an element one step towards the front.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn move_up(&mut self, id: &ElementId) -> DesignResult<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        if index + 1 < self.elements.len() {
            self.elements.swap(index, index + 1);
        }
        Ok(())
    }

    /// Move an element one step towards the back.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn move_down(&mut self, id: &ElementId) -> DesignResult<()> {
        let index = self
            .index_of(id)
            .ok_or_else(|| DesignError::ElementNotFound(id.to_string()))?;
        if index > 0 {
            self.elements.swap(index, index - 1);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Locking and visibility
    // -----------------------------------------------------------------------

    /// Lock an element against deletion.
    pub fn lock(&mut self, id: &ElementId) {
        self.locked.insert(id.clone());
    }

    /// Unlock an element.
    pub fn unlock(&mut self, id: &ElementId) {
        self.locked.remove(id);
    }

    /// Flip the lock state. Returns the new state.
    pub fn toggle_lock(&mut self, id: &ElementId) -> bool {
        if self.locked.remove(id) {
            false
        } else {
            self.locked.insert(id.clone());
            true
        }
    }

    /// Whether an element is locked.
    #[must_use]
    pub fn is_locked(&self, id: &ElementId) -> bool {
        self.locked.contains(id)
    }

    /// Locked ids, sorted.
    #[must_use]
    pub fn locked(&self) -> &BTreeSet<ElementId> {
        &self.locked
    }

    /// Replace the locked set wholesale.
    pub fn set_locked(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.locked = ids.into_iter().collect();
    }

    /// Hide an element. Hiding the selected element clears the selection.
    pub fn hide(&mut self, id: &ElementId) {
        self.hidden.insert(id.clone());
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    /// Show a hidden element.
    pub fn show(&mut self, id: &ElementId) {
        self.hidden.remove(id);
    }

    /// Flip visibility. Returns `true` if the element is now visible.
    pub fn toggle_visibility(&mut self, id: &ElementId) -> bool {
        if self.hidden.contains(id) {
            self.show(id);
            true
        } else {
            self.hide(id);
            false
        }
    }

    /// Whether an element is hidden.
    #[must_use]
    pub fn is_hidden(&self, id: &ElementId) -> bool {
        self.hidden.contains(id)
    }

    /// Hidden ids, sorted.
    #[must_use]
    pub fn hidden(&self) -> &BTreeSet<ElementId> {
        &self.hidden
    }

    /// Replace the hidden set wholesale.
    pub fn set_hidden(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.hidden = ids.into_iter().collect();
    }

    // -----------------------------------------------------------------------
    // Element edits
    // -----------------------------------------------------------------------

    /// Align the selected element against a canvas of `width` x `height`.
    ///
    /// No-op without a selection.
    pub fn align_selected(&mut self, alignment: Alignment, width: f64, height: f64) {
        let Some(id) = self.selected.clone() else {
            return;
        };
        let aligned = self.update(&id, |element| {
            let (w, h) = element.scaled_size();
            match alignment {
                Alignment::Left => element.position.x = 0.0,
                Alignment::Center => element.position.x = (width - w) / 2.0,
                Alignment::Right => element.position.x = width - w,
                Alignment::Top => element.position.y = 0.0,
                Alignment::Middle => element.position.y = (height - h) / 2.0,
                Alignment::Bottom => element.position.y = height - h,
            }
        });
        if let Err(e) = aligned {
            tracing::debug!(error = %e, "Failed to align selected element");
        }
    }

    /// Rotate an element by a quarter turn clockwise. Returns the new rotation.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist.
    pub fn rotate_quarter(&mut self, id: &ElementId) -> DesignResult<f64> {
        let mut rotation = 0.0;
        self.update(id, |element| {
            element.rotation += 90.0;
            rotation = element.rotation;
        })?;
        Ok(rotation)
    }

    /// Point an image element at a new source, dropping drawing provenance.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist,
    /// or [`DesignError::InvalidOperation`] if it is not an image.
    pub fn change_image_source(&mut self, id: &ElementId, src: &str) -> DesignResult<()> {
        let mut is_image = true;
        self.update(id, |element| match &mut element.kind {
            ElementKind::Image(image) => {
                image.src = src.to_string();
                image.is_drawing = false;
                image.original_width = None;
                image.original_height = None;
            }
            _ => is_image = false,
        })?;
        if is_image {
            Ok(())
        } else {
            Err(DesignError::InvalidOperation(format!("{id} is not an image")))
        }
    }

    /// Change the font of a text or monogram element.
    ///
    /// Monograms with known letters and layout recompose their content.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::ElementNotFound`] if the element does not exist,
    /// or [`DesignError::InvalidOperation`] if it carries no text.
    pub fn set_font(&mut self, id: &ElementId, font: &str) -> DesignResult<()> {
        let mut has_text = true;
        self.update(id, |element| match &mut element.kind {
            ElementKind::Text(text) => text.style.font = font.to_string(),
            ElementKind::Monogram(monogram) => {
                monogram.style.font = font.to_string();
                if let (Some(letters), Some(layout)) =
                    (&monogram.monogram_letters, &monogram.layout_style)
                {
                    monogram.style.content = letters.compose(layout);
                }
            }
            ElementKind::Image(_) | ElementKind::Emoji(_) => has_text = false,
        })?;
        if has_text {
            Ok(())
        } else {
            Err(DesignError::InvalidOperation(format!("{id} has no text")))
        }
    }
}
