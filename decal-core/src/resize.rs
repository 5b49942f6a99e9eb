//! Proportional rescale of a design onto a product with different bounds.

use crate::collection::ElementCollection;
use crate::product::ProductDescriptor;
use crate::{DesignError, DesignResult};

/// Scale factors applied by [`rescale`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeFactors {
    /// Horizontal factor, `new.width / old.width`.
    pub sx: f64,
    /// Vertical factor, `new.height / old.height`.
    pub sy: f64,
}

impl ResizeFactors {
    /// Compute factors between two products.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::InvalidOperation`] if `old` has a zero dimension.
    pub fn between(old: &ProductDescriptor, new: &ProductDescriptor) -> DesignResult<Self> {
        if old.width == 0 || old.height == 0 {
            return Err(DesignError::InvalidOperation(format!(
                "cannot resize from zero-sized product {}",
                old.label()
            )));
        }
        Ok(Self {
            sx: f64::from(new.width) / f64::from(old.width),
            sy: f64::from(new.height) / f64::from(old.height),
        })
    }

    /// Uniform factor used for scale and font size.
    #[must_use]
    pub fn average(&self) -> f64 {
        (self.sx + self.sy) / 2.0
    }

    /// Whether both factors are exactly one.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        (self.sx - 1.0).abs() < f64::EPSILON && (self.sy - 1.0).abs() < f64::EPSILON
    }
}

/// Rescale every element from `old` bounds to `new` bounds.
///
/// Positions scale per axis, the uniform scale and text font sizes by the
/// average of both factors. Each element goes through the collection's
/// single-element update so its geometry stays normalized.
///
/// # Errors
///
/// Returns [`DesignError::InvalidOperation`] if `old` has a zero dimension.
pub fn rescale(
    old: &ProductDescriptor,
    new: &ProductDescriptor,
    collection: &mut ElementCollection,
) -> DesignResult<ResizeFactors> {
    let factors = ResizeFactors::between(old, new)?;
    let average = factors.average();

    let ids: Vec<_> = collection.elements().iter().map(|e| e.id.clone()).collect();
    for id in &ids {
        collection.update(id, |element| {
            element.position.x *= factors.sx;
            element.position.y *= factors.sy;
            element.scale *= average;
            if let Some(style) = element.text_style_mut() {
                style.font_size = (style.font_size * average).round();
            }
        })?;
    }

    tracing::debug!(
        from = %old.label(),
        to = %new.label(),
        sx = factors.sx,
        sy = factors.sy,
        elements = ids.len(),
        "Rescaled design"
    );
    Ok(factors)
}
