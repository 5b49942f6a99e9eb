//! Product descriptor - the physical product and its printable canvas.

use serde::{Deserialize, Serialize};

/// Default product type.
pub const DEFAULT_PRODUCT_TYPE: &str = "bandit";

/// Default product size.
pub const DEFAULT_PRODUCT_SIZE: &str = "23oz";

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// The active product and its canvas pixel bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductDescriptor {
    /// Product family (e.g. `bandit`).
    #[serde(rename = "type")]
    pub product_type: String,
    /// Size label (e.g. `23oz`).
    pub size: String,
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
}

impl ProductDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(product_type: &str, size: &str, width: u32, height: u32) -> Self {
        Self {
            product_type: product_type.to_string(),
            size: size.to_string(),
            width,
            height,
        }
    }

    /// Whether this product's canvas is at least as large as `other` in both axes.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.width >= other.width && self.height >= other.height
    }

    /// Human-readable label, e.g. `bandit 23oz`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.product_type, self.size)
    }
}

impl Default for ProductDescriptor {
    fn default() -> Self {
        Self::new(
            DEFAULT_PRODUCT_TYPE,
            DEFAULT_PRODUCT_SIZE,
            DEFAULT_CANVAS_WIDTH,
            DEFAULT_CANVAS_HEIGHT,
        )
    }
}

/// Owner of the single active product descriptor.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    current: ProductDescriptor,
}

impl ProductStore {
    /// Create a store with the given active product.
    #[must_use]
    pub fn new(current: ProductDescriptor) -> Self {
        Self { current }
    }

    /// The active product.
    #[must_use]
    pub fn current(&self) -> &ProductDescriptor {
        &self.current
    }

    /// Replace the active product.
    pub fn set_product(&mut self, product: ProductDescriptor) {
        tracing::debug!(product = %product.label(), width = product.width, height = product.height, "Product set");
        self.current = product;
    }
}
