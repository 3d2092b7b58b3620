//! Bridge configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use content_bridge::{BridgeConfig, FetchConfig};
//!
//! let config = BridgeConfig::new()
//!     .with_lookup_attribute("data-agent-id")
//!     .with_fetch(FetchConfig::new().with_timeout(Duration::from_secs(20)));
//!
//! assert_eq!(config.lookup_attribute, "data-agent-id");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::dom::{HighlightStyle, ScrollOptions};
use crate::dom::selector::is_valid_attribute_name;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Attribute the annotation service writes onto nodes.
pub const DEFAULT_LOOKUP_ATTRIBUTE: &str = "data-id";

// ============================================================================
// BridgeConfig
// ============================================================================

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Attribute resolved by element lookups.
    pub lookup_attribute: String,

    /// Marker applied to the highlighted node.
    pub highlight_style: HighlightStyle,

    /// How the highlighted node is scrolled into view.
    pub scroll: ScrollOptions,

    /// Fetch proxy settings.
    pub fetch: FetchConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lookup_attribute: DEFAULT_LOOKUP_ATTRIBUTE.to_string(),
            highlight_style: HighlightStyle::default(),
            scroll: ScrollOptions::default(),
            fetch: FetchConfig::new(),
        }
    }

    /// Sets the lookup attribute.
    #[inline]
    #[must_use]
    pub fn with_lookup_attribute(mut self, name: impl Into<String>) -> Self {
        self.lookup_attribute = name.into();
        self
    }

    /// Sets the highlight marker.
    #[inline]
    #[must_use]
    pub fn with_highlight_style(mut self, style: HighlightStyle) -> Self {
        self.highlight_style = style;
        self
    }

    /// Sets the scroll options.
    #[inline]
    #[must_use]
    pub fn with_scroll(mut self, scroll: ScrollOptions) -> Self {
        self.scroll = scroll;
        self
    }

    /// Sets the fetch proxy settings.
    #[inline]
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the lookup attribute is not a valid
    /// attribute name.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_attribute_name(&self.lookup_attribute) {
            return Err(Error::config(format!(
                "Invalid lookup attribute: {:?}\n\
                 Use a plain attribute name such as \"{DEFAULT_LOOKUP_ATTRIBUTE}\".",
                self.lookup_attribute
            )));
        }
        Ok(())
    }
}

// ============================================================================
// FetchConfig
// ============================================================================

/// Fetch proxy settings.
///
/// The bridge imposes no timeout unless one is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchConfig {
    /// Base for page-relative URLs (usually the page origin).
    pub base_url: Option<Url>,

    /// Per-request timeout.
    pub timeout: Option<Duration>,

    /// `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl FetchConfig {
    /// Creates settings with no base URL, timeout or user agent.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Sets the base URL for relative requests.
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Sets the per-request timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent.
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
