//! Background descriptor and its owning store.

use serde::{Deserialize, Serialize};

use crate::element::Extra;

/// Default background opacity.
pub const DEFAULT_OPACITY: f64 = 1.0;

/// Which background source is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    /// No background.
    #[default]
    None,
    /// Flat color.
    Solid,
    /// Generated pattern.
    Pattern,
    /// Uploaded or linked image.
    Image,
}

impl BackgroundType {
    /// All variants in definition order.
    pub const ALL: [Self; 4] = [Self::None, Self::Solid, Self::Pattern, Self::Image];

    /// The JSON tag for this variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Pattern => "pattern",
            Self::Image => "image",
        }
    }

    /// Parse a JSON tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

/// The active background.
///
/// Only the field matching `background_type` is authoritative; the others may
/// hold stale values from earlier selections and are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundDescriptor {
    /// Authoritative source.
    #[serde(rename = "type")]
    pub background_type: BackgroundType,
    /// Solid fill color as hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid_color: Option<String>,
    /// Opaque pattern reference understood by the pattern generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<serde_json::Value>,
    /// Background image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Opacity in `[0, 1]`.
    #[serde(default = "BackgroundDescriptor::default_opacity")]
    pub opacity: f64,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

impl BackgroundDescriptor {
    const fn default_opacity() -> f64 {
        DEFAULT_OPACITY
    }

    /// Whether a visible background is set.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.background_type != BackgroundType::None
    }

    /// Name of the installed pattern, if the pattern reference carries one.
    #[must_use]
    pub fn pattern_name(&self) -> Option<&str> {
        self.pattern
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(serde_json::Value::as_str)
    }
}

impl Default for BackgroundDescriptor {
    fn default() -> Self {
        Self {
            background_type: BackgroundType::None,
            solid_color: None,
            pattern: None,
            image_url: None,
            opacity: DEFAULT_OPACITY,
            extra: Extra::new(),
        }
    }
}

/// Owner of the active background.
#[derive(Debug, Clone, Default)]
pub struct BackgroundStore {
    current: BackgroundDescriptor,
    /// Set when a color change asked the pattern generator to re-tint.
    pattern_refresh_pending: bool,
}

impl BackgroundStore {
    /// Create a store with no background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active background.
    #[must_use]
    pub fn current(&self) -> &BackgroundDescriptor {
        &self.current
    }

    /// Switch to a solid color.
    ///
    /// With `refresh_pattern` set and a pattern installed, the pattern is kept
    /// and flagged for regeneration in the new color instead of being replaced.
    pub fn set_solid_color(&mut self, color: &str, refresh_pattern: bool) {
        if refresh_pattern && self.current.pattern.is_some() {
            self.pattern_refresh_pending = true;
        } else {
            self.current.background_type = BackgroundType::Solid;
        }
        self.current.solid_color = Some(color.to_string());
    }

    /// Install a pattern reference.
    pub fn set_pattern(&mut self, pattern: serde_json::Value) {
        self.current.background_type = BackgroundType::Pattern;
        self.current.pattern = Some(pattern);
    }

    /// Install a background image.
    pub fn set_image(&mut self, url: &str) {
        self.current.background_type = BackgroundType::Image;
        self.current.image_url = Some(url.to_string());
    }

    /// Set opacity, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_opacity(&mut self, opacity: f64) {
        if opacity.is_finite() {
            self.current.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    /// Remove the background.
    pub fn clear(&mut self) {
        self.current = BackgroundDescriptor::default();
        self.pattern_refresh_pending = false;
    }

    /// Whether a pattern regeneration was requested since the last call.
    pub fn take_pattern_refresh(&mut self) -> bool {
        std::mem::take(&mut self.pattern_refresh_pending)
    }

    /// Apply a descriptor through the type-specific setters.
    ///
    /// Fields belonging to other background types and unrecognized fields of
    /// `background` are carried over. A `solid` descriptor never triggers
    /// pattern regeneration. Opacity other than the default is applied after
    /// the type setter.
    pub fn apply(&mut self, background: Option<&BackgroundDescriptor>) {
        self.clear();
        let Some(bg) = background else {
            return;
        };

        match bg.background_type {
            BackgroundType::Solid => {
                if let Some(color) = &bg.solid_color {
                    self.set_solid_color(color, false);
                }
            }
            BackgroundType::Pattern => {
                if let Some(pattern) = &bg.pattern {
                    self.set_pattern(pattern.clone());
                }
            }
            BackgroundType::Image => {
                if let Some(url) = &bg.image_url {
                    self.set_image(url);
                }
            }
            BackgroundType::None => return,
        }

        if (bg.opacity - DEFAULT_OPACITY).abs() > f64::EPSILON {
            self.set_opacity(bg.opacity);
        }
        // Inactive fields are ignored when drawing but kept for round trips.
        self.current.background_type = bg.background_type;
        self.current.solid_color.clone_from(&bg.solid_color);
        self.current.pattern.clone_from(&bg.pattern);
        self.current.image_url.clone_from(&bg.image_url);
        self.current.extra = bg.extra.clone();
    }
}
