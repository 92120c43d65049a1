//! Status bar and spacer styling.
//!
//! The status bar style follows the system theme. The OS keyboard overlay
//! resets the style when it appears or hides, so keyboard events reapply the
//! last style computed from the theme. That style lives in the synchronizer
//! itself, owned by the application context; the latest theme change wins.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// System appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light appearance.
    #[default]
    Light,
    /// Dark appearance.
    Dark,
}

impl Theme {
    /// Theme from a dark-mode flag.
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

/// Status bar text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusBarStyle {
    /// Light text, for dark backgrounds.
    LightContent,
    /// Dark text, for light backgrounds.
    DarkContent,
}

impl StatusBarStyle {
    /// Style that stays readable under `theme`.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::LightContent,
            Theme::Light => Self::DarkContent,
        }
    }
}

impl std::fmt::Display for StatusBarStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LightContent => write!(f, "light-content"),
            Self::DarkContent => write!(f, "dark-content"),
        }
    }
}

/// Keyboard visibility transitions that reset the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// The keyboard is about to appear.
    WillShow,
    /// The keyboard finished hiding.
    DidHide,
}

/// Platform status bar and the spacer view drawn under it.
pub trait StatusBar: Send + Sync {
    /// Apply `style`, optionally animated.
    fn set_style(&self, style: StatusBarStyle, animated: bool);

    /// Paint the spacer view with a CSS hex colour.
    fn set_spacer_color(&self, color: &str);
}

/// Keeps the status bar and the spacer view in step with theme and keyboard.
pub struct ChromeSynchronizer {
    status_bar: Arc<dyn StatusBar>,
    theme: Theme,
    current_style: StatusBarStyle,
    nav_scrolled: bool,
}

impl std::fmt::Debug for ChromeSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeSynchronizer")
            .field("theme", &self.theme)
            .field("current_style", &self.current_style)
            .field("nav_scrolled", &self.nav_scrolled)
            .finish_non_exhaustive()
    }
}

impl ChromeSynchronizer {
    /// Synchronizer starting from `theme`. Nothing is applied until
    /// [`Self::on_theme_change`] or [`Self::reapply`].
    pub fn new(status_bar: Arc<dyn StatusBar>, theme: Theme) -> Self {
        Self {
            status_bar,
            theme,
            current_style: StatusBarStyle::for_theme(theme),
            nav_scrolled: false,
        }
    }

    /// Recompute the style from `theme`, remember it and apply it.
    pub fn on_theme_change(&mut self, theme: Theme) -> StatusBarStyle {
        self.theme = theme;
        self.current_style = StatusBarStyle::for_theme(theme);
        log::debug!("[Chrome] Theme {:?} -> {}", theme, self.current_style);
        self.status_bar.set_style(self.current_style, true);
        self.status_bar.set_spacer_color(self.spacer_color());
        self.current_style
    }

    /// Restore the remembered style after the keyboard overlay reset it.
    pub fn on_keyboard(&self, event: KeyboardEvent) {
        log::debug!("[Chrome] Keyboard {:?}, restoring {}", event, self.current_style);
        self.status_bar.set_style(self.current_style, false);
    }

    /// Apply the remembered style again.
    pub fn reapply(&self) {
        self.status_bar.set_style(self.current_style, true);
    }

    /// Record whether the content's navigation bar is scrolled and repaint the spacer.
    pub fn set_nav_scrolled(&mut self, scrolled: bool) {
        self.nav_scrolled = scrolled;
        self.status_bar.set_spacer_color(self.spacer_color());
    }

    /// The style last computed from the theme.
    pub fn current_style(&self) -> StatusBarStyle {
        self.current_style
    }

    /// The current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Background colour of the spacer view under the status bar.
    pub fn spacer_color(&self) -> &'static str {
        match (self.theme, self.nav_scrolled) {
            (Theme::Dark, true) => "#1f1f1f",
            (Theme::Dark, false) => "#000",
            (Theme::Light, true) => "#fff",
            (Theme::Light, false) => "#f0f2f3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingStatusBar;

    fn synchronizer() -> (Arc<RecordingStatusBar>, ChromeSynchronizer) {
        let bar = Arc::new(RecordingStatusBar::default());
        let chrome = ChromeSynchronizer::new(bar.clone(), Theme::Light);
        (bar, chrome)
    }

    #[test]
    fn test_theme_change_applies_and_remembers() {
        let (bar, mut chrome) = synchronizer();

        assert_eq!(chrome.on_theme_change(Theme::Dark), StatusBarStyle::LightContent);
        assert_eq!(chrome.current_style(), StatusBarStyle::LightContent);
        assert_eq!(bar.last(), Some(StatusBarStyle::LightContent));
    }

    #[test]
    fn test_keyboard_restores_latest_theme_style() {
        let (bar, mut chrome) = synchronizer();

        chrome.on_theme_change(Theme::Dark);
        chrome.on_keyboard(KeyboardEvent::WillShow);
        chrome.on_theme_change(Theme::Light);
        chrome.on_keyboard(KeyboardEvent::DidHide);

        assert_eq!(bar.last(), Some(StatusBarStyle::DarkContent));
    }

    #[test]
    fn test_applied_style_tracks_most_recent_theme_under_interleaving() {
        let events = [
            Some(Theme::Dark),
            None,
            None,
            Some(Theme::Light),
            Some(Theme::Dark),
            None,
            Some(Theme::Light),
            None,
            None,
        ];
        let (bar, mut chrome) = synchronizer();
        let mut latest = None;

        for event in events {
            match event {
                Some(theme) => {
                    chrome.on_theme_change(theme);
                    latest = Some(theme);
                }
                None => chrome.on_keyboard(KeyboardEvent::WillShow),
            }
            if let Some(theme) = latest {
                assert_eq!(bar.last(), Some(StatusBarStyle::for_theme(theme)));
            }
        }
    }

    #[test]
    fn test_spacer_color_is_painted_on_theme_and_scroll() {
        let (bar, mut chrome) = synchronizer();
        assert_eq!(chrome.spacer_color(), "#f0f2f3");
        assert_eq!(bar.last_spacer(), None);

        chrome.set_nav_scrolled(true);
        assert_eq!(bar.last_spacer().as_deref(), Some("#fff"));
        chrome.on_theme_change(Theme::Dark);
        assert_eq!(bar.last_spacer().as_deref(), Some("#1f1f1f"));
        chrome.set_nav_scrolled(false);
        assert_eq!(bar.last_spacer().as_deref(), Some("#000"));

        chrome.on_keyboard(KeyboardEvent::DidHide);
        assert_eq!(bar.spacers(), vec!["#fff", "#1f1f1f", "#000"]);
        assert_eq!(
            bar.applied(),
            vec![StatusBarStyle::LightContent, StatusBarStyle::LightContent]
        );
    }

    #[test]
    fn test_style_wire_names() {
        assert_eq!(StatusBarStyle::LightContent.to_string(), "light-content");
        assert_eq!(
            serde_json::to_string(&StatusBarStyle::DarkContent).unwrap(),
            "\"dark-content\""
        );
    }
}
