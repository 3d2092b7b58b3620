//! Highlight marker and scroll options.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// HighlightStyle
// ============================================================================

/// Inline style properties applied to the highlighted node.
///
/// The bridge only ever writes these five properties and clears them by
/// setting the empty string, so nothing author-set needs to be cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightStyle {
    /// `outline`
    pub outline: String,
    /// `outline-offset`
    pub outline_offset: String,
    /// `background-color`
    pub background_color: String,
    /// `transition`
    pub transition: String,
    /// `cursor`
    pub cursor: String,
}

impl HighlightStyle {
    /// CSS property names, in the order they are applied.
    pub const PROPERTIES: [&'static str; 5] = [
        "outline",
        "outline-offset",
        "background-color",
        "transition",
        "cursor",
    ];

    /// Returns `(property, value)` pairs in application order.
    #[must_use]
    pub fn declarations(&self) -> [(&'static str, &str); 5] {
        [
            (Self::PROPERTIES[0], self.outline.as_str()),
            (Self::PROPERTIES[1], self.outline_offset.as_str()),
            (Self::PROPERTIES[2], self.background_color.as_str()),
            (Self::PROPERTIES[3], self.transition.as_str()),
            (Self::PROPERTIES[4], self.cursor.as_str()),
        ]
    }

    /// Sets the outline color, keeping the tint in sync.
    #[must_use]
    pub fn with_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.outline = format!("3px solid #{r:02X}{g:02X}{b:02X}");
        self.background_color = format!("rgba({r}, {g}, {b}, 0.1)");
        self
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            outline: "3px solid #4CAF50".to_string(),
            outline_offset: "2px".to_string(),
            background_color: "rgba(76, 175, 80, 0.1)".to_string(),
            transition: "all 0.3s ease".to_string(),
            cursor: "pointer".to_string(),
        }
    }
}

// ============================================================================
// ScrollOptions
// ============================================================================

/// Scroll animation behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Animated scroll.
    #[default]
    Smooth,
    /// Jump immediately.
    Instant,
    /// Whatever the page's CSS says.
    Auto,
}

/// Alignment of the node inside the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollLogicalPosition {
    /// Align to the start edge.
    Start,
    /// Center in the viewport.
    #[default]
    Center,
    /// Align to the end edge.
    End,
    /// Scroll as little as possible.
    Nearest,
}

/// Options passed to [`Document::scroll_into_view`](super::Document::scroll_into_view).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollOptions {
    /// Animation behavior.
    pub behavior: ScrollBehavior,
    /// Vertical alignment.
    pub block: ScrollLogicalPosition,
    /// Horizontal alignment.
    pub inline: ScrollLogicalPosition,
}

// ============================================================================
// Tests
// ============================================================================
