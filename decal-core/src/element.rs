//! Design elements - the items a customer places on the product surface.
//!
//! Every element shares geometry (`position`, `scale`, `rotation`, `width`,
//! `height`) and carries variant-specific content selected by the JSON `type`
//! tag. Fields the current schema does not know about are kept in a per-variant
//! side-map and written back verbatim, so documents produced by newer editors
//! survive a round trip through this one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unrecognized fields carried through capture, restore and serialization.
pub type Extra = BTreeMap<String, serde_json::Value>;

/// Position used when an element arrives without usable coordinates.
pub const DEFAULT_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Default uniform scale factor.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Default rotation in degrees.
pub const DEFAULT_ROTATION: f64 = 0.0;

/// Default font size for new text elements, in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Default font family for new text elements.
pub const DEFAULT_FONT: &str = "sans";

/// Default text color.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// Unique identifier for an element.
///
/// Generated ids look like `text-6f1c...`; ids read from documents are taken
/// verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh id for an element of the given type.
    #[must_use]
    pub fn generate(kind: ElementType) -> Self {
        Self(format!("{}-{}", kind.as_str(), Uuid::new_v4().simple()))
    }

    /// Wrap an existing id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four element variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Free text.
    Text,
    /// Raster image or freehand drawing.
    Image,
    /// A single emoji glyph.
    Emoji,
    /// Two or three initials in a monogram layout.
    Monogram,
}

impl ElementType {
    /// All variants in definition order.
    pub const ALL: [Self; 4] = [Self::Text, Self::Image, Self::Emoji, Self::Monogram];

    /// The JSON tag for this variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Emoji => "emoji",
            Self::Monogram => "monogram",
        }
    }

    /// Parse a JSON tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

/// Canvas position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Pixels from the left edge.
    pub x: f64,
    /// Pixels from the top edge.
    pub y: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Position {
    fn default() -> Self {
        DEFAULT_POSITION
    }
}

/// Typography shared by text and monogram elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Rendered text.
    #[serde(default)]
    pub content: String,
    /// Font family key.
    #[serde(default = "TextStyle::default_font")]
    pub font: String,
    /// Fill color as hex.
    #[serde(default = "TextStyle::default_color")]
    pub color: String,
    /// Font size in pixels.
    #[serde(default = "TextStyle::default_font_size")]
    pub font_size: f64,
    /// Bold weight.
    #[serde(default)]
    pub bold: bool,
    /// Italic style.
    #[serde(default)]
    pub italic: bool,
    /// Underline decoration.
    #[serde(default)]
    pub underline: bool,
    /// Text transformation (e.g. `uppercase`), empty for none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transformation: String,
    /// Whether the content can be edited in place.
    #[serde(default = "TextStyle::default_editable")]
    pub editable: bool,
}

impl TextStyle {
    fn default_font() -> String {
        DEFAULT_FONT.to_string()
    }

    fn default_color() -> String {
        DEFAULT_TEXT_COLOR.to_string()
    }

    const fn default_font_size() -> f64 {
        DEFAULT_FONT_SIZE
    }

    const fn default_editable() -> bool {
        true
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: String::new(),
            font: Self::default_font(),
            color: Self::default_color(),
            font_size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            transformation: String::new(),
            editable: true,
        }
    }
}

/// Text element payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Typography and content.
    #[serde(flatten)]
    pub style: TextStyle,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Image element payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    /// Image URL or embedded data URI.
    #[serde(default)]
    pub src: String,
    /// Whether the image came from the freehand drawing tool.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_drawing: bool,
    /// Drawing bounds width at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_width: Option<f64>,
    /// Drawing bounds height at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_height: Option<f64>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Emoji element payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmojiElement {
    /// Glyph used for rendering.
    #[serde(default)]
    pub content: String,
    /// Glyph as picked by the user.
    #[serde(default)]
    pub emoji: String,
    /// Emoji are never edited in place.
    #[serde(default)]
    pub editable: bool,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Initials making up a monogram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonogramLetters {
    /// First initial.
    #[serde(default)]
    pub first: String,
    /// Middle initial.
    #[serde(default)]
    pub middle: String,
    /// Last initial.
    #[serde(default)]
    pub last: String,
}

impl MonogramLetters {
    /// Create a letter set.
    #[must_use]
    pub fn new(first: &str, middle: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            middle: middle.to_string(),
            last: last.to_string(),
        }
    }

    /// Compose the display content for a layout style.
    ///
    /// One letter renders alone. Two letters use first and last. Three
    /// letters follow the layout: `traditional` puts the last initial in the
    /// middle, `stacked`/`vertical` break lines, everything else runs them
    /// together.
    #[must_use]
    pub fn compose(&self, layout: &str) -> String {
        let f = self.first.to_uppercase();
        let m = self.middle.to_uppercase();
        let l = self.last.to_uppercase();
        let count = [&f, &m, &l].iter().filter(|s| !s.is_empty()).count();

        match count {
            0 => String::new(),
            1 => f,
            2 => match layout {
                "horizontal" => format!("{f} {l}"),
                "stacked" | "vertical" => format!("{f}\n{l}"),
                _ => format!("{f}{l}"),
            },
            _ => match layout {
                "traditional" => format!("{f}{l}{m}"),
                "stacked" | "vertical" => format!("{f}\n{m}\n{l}"),
                _ => format!("{f}{m}{l}"),
            },
        }
    }
}

/// Monogram element payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonogramElement {
    /// Typography and composed content.
    #[serde(flatten)]
    pub style: TextStyle,
    /// Source initials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monogram_letters: Option<MonogramLetters>,
    /// Layout style key (`circle`, `traditional`, `horizontal`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_style: Option<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Variant-specific element content, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Free text.
    Text(TextElement),
    /// Raster image or drawing.
    Image(ImageElement),
    /// Emoji glyph.
    Emoji(EmojiElement),
    /// Monogram initials.
    Monogram(MonogramElement),
}

impl ElementKind {
    /// The variant tag.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Text(_) => ElementType::Text,
            Self::Image(_) => ElementType::Image,
            Self::Emoji(_) => ElementType::Emoji,
            Self::Monogram(_) => ElementType::Monogram,
        }
    }

    /// Unrecognized fields carried by this element.
    #[must_use]
    pub fn extra(&self) -> &Extra {
        match self {
            Self::Text(e) => &e.extra,
            Self::Image(e) => &e.extra,
            Self::Emoji(e) => &e.extra,
            Self::Monogram(e) => &e.extra,
        }
    }
}

/// A placed design element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Canvas position.
    #[serde(default)]
    pub position: Position,
    /// Uniform scale factor.
    #[serde(default = "Element::default_scale")]
    pub scale: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Nominal unscaled width in pixels.
    #[serde(default)]
    pub width: f64,
    /// Nominal unscaled height in pixels.
    #[serde(default)]
    pub height: f64,
    /// Variant content.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    const fn default_scale() -> f64 {
        DEFAULT_SCALE
    }

    /// Create an element with a fresh id and default geometry.
    #[must_use]
    pub fn new(kind: ElementKind, width: f64, height: f64) -> Self {
        Self {
            id: ElementId::generate(kind.element_type()),
            position: DEFAULT_POSITION,
            scale: DEFAULT_SCALE,
            rotation: DEFAULT_ROTATION,
            width,
            height,
            kind,
        }
    }

    /// An empty, editable text box at the given point.
    #[must_use]
    pub fn text(content: &str, x: f64, y: f64) -> Self {
        let style = TextStyle {
            content: content.to_string(),
            ..TextStyle::default()
        };
        Self::new(
            ElementKind::Text(TextElement {
                style,
                extra: Extra::new(),
            }),
            300.0,
            100.0,
        )
        .with_position(x, y)
    }

    /// An image from a URL or data URI.
    #[must_use]
    pub fn image(src: &str) -> Self {
        Self::new(
            ElementKind::Image(ImageElement {
                src: src.to_string(),
                ..ImageElement::default()
            }),
            200.0,
            200.0,
        )
    }

    /// A freehand drawing rasterized to `src`, centered on its bounds.
    #[must_use]
    pub fn drawing(src: &str, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(
            ElementKind::Image(ImageElement {
                src: src.to_string(),
                is_drawing: true,
                original_width: Some(width),
                original_height: Some(height),
                extra: Extra::new(),
            }),
            width,
            height,
        )
        .with_position(left + width / 2.0, top + height / 2.0)
    }

    /// An emoji glyph.
    #[must_use]
    pub fn emoji(glyph: &str) -> Self {
        let mut element = Self::new(
            ElementKind::Emoji(EmojiElement {
                content: glyph.to_string(),
                emoji: glyph.to_string(),
                editable: false,
                extra: Extra::new(),
            }),
            100.0,
            100.0,
        )
        .with_position(50.0, 50.0);
        element.scale = 5.0;
        element
    }

    /// A monogram composed from initials.
    #[must_use]
    pub fn monogram(letters: MonogramLetters, layout: &str) -> Self {
        let style = TextStyle {
            content: letters.compose(layout),
            editable: false,
            ..TextStyle::default()
        };
        Self::new(
            ElementKind::Monogram(MonogramElement {
                style,
                monogram_letters: Some(letters),
                layout_style: Some(layout.to_string()),
                extra: Extra::new(),
            }),
            200.0,
            200.0,
        )
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the scale factor.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// The variant tag.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Typography, for text and monogram elements.
    #[must_use]
    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.kind {
            ElementKind::Text(e) => Some(&e.style),
            ElementKind::Monogram(e) => Some(&e.style),
            ElementKind::Image(_) | ElementKind::Emoji(_) => None,
        }
    }

    /// Mutable typography, for text and monogram elements.
    pub fn text_style_mut(&mut self) -> Option<&mut TextStyle> {
        match &mut self.kind {
            ElementKind::Text(e) => Some(&mut e.style),
            ElementKind::Monogram(e) => Some(&mut e.style),
            ElementKind::Image(_) | ElementKind::Emoji(_) => None,
        }
    }

    /// Width and height after applying the scale factor.
    #[must_use]
    pub fn scaled_size(&self) -> (f64, f64) {
        (self.width * self.scale, self.height * self.scale)
    }

    /// Replace unusable geometry with defaults.
    ///
    /// Returns `true` if anything was repaired.
    pub fn normalize(&mut self) -> bool {
        let mut repaired = false;
        if !self.position.is_finite() {
            self.position = DEFAULT_POSITION;
            repaired = true;
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            self.scale = DEFAULT_SCALE;
            repaired = true;
        }
        if !self.rotation.is_finite() {
            self.rotation = DEFAULT_ROTATION;
            repaired = true;
        }
        // Non-finite numbers serialize as null and would not parse back.
        for side in [&mut self.width, &mut self.height] {
            if !side.is_finite() {
                *side = 0.0;
                repaired = true;
            }
        }
        if let Some(style) = self.text_style_mut() {
            if !style.font_size.is_finite() {
                style.font_size = DEFAULT_FONT_SIZE;
                repaired = true;
            }
        }
        repaired
    }
}
