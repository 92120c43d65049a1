//! Embedded browser surface and the location it currently shows.
//!
//! The location is tracked only to gate `auth` messages: registration is
//! accepted from the content's root path (`/`) and nowhere else.

use reqwest::Url;

/// Commands the host issues to the embedded browser surface.
///
/// Back navigation with an empty history is a no-op on the surface side.
pub trait WebSurface: Send + Sync {
    /// Load a URI into the surface.
    fn load(&self, uri: &str);

    /// Navigate back one history entry.
    fn go_back(&self);

    /// The surface reported that it now shows `url`.
    ///
    /// Surfaces that keep their own history ignore this.
    fn visited(&self, _url: &str) {}
}

/// Current location of the embedded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationLocation {
    url: String,
}

impl NavigationLocation {
    /// Location at the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Record a navigation state change reported by the surface.
    pub fn update(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// The full URL as reported.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path component, or `None` if the URL does not parse.
    pub fn path(&self) -> Option<String> {
        Url::parse(&self.url).ok().map(|url| url.path().to_string())
    }

    /// Whether the content is at its root path (`/`).
    ///
    /// Query strings and fragments do not matter; unparseable URLs are never root.
    pub fn is_root(&self) -> bool {
        self.path().as_deref() == Some("/")
    }
}
