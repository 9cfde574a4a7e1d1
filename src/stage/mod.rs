//! Live output and preview display surfaces.
//!
//! Both surfaces hold one piece of [`DisplayContent`] plus a zoom level and a
//! fullscreen flag. The operator stages content on the preview and promotes
//! it with [`Stage::go_live`]; quick actions (alert, black, white, logo) go
//! straight to the live output.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::display::{
    ALERT_BACKGROUND_COLOR, ALERT_FONT_SIZE, ALERT_TEXT, DEFAULT_BACKGROUND_COLOR, DEFAULT_FONT_COLOR,
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, ZOOM_DEFAULT_PERCENT, ZOOM_MAX_PERCENT, ZOOM_MIN_PERCENT,
    ZOOM_STEP_PERCENT,
};
use crate::error::{Error, Result};
use crate::types::Alignment;

/// Font and color settings for text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    /// Text color.
    pub font_color: String,
    /// Background color.
    pub background_color: String,
    /// Font size in points, before zoom.
    pub font_size: u32,
    /// Font family.
    pub font_family: String,
    /// Horizontal alignment.
    pub alignment: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_color: DEFAULT_FONT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            alignment: Alignment::Centered,
        }
    }
}

impl TextStyle {
    /// Default style with the given colors.
    fn solid(background: &str, font_color: &str) -> Self {
        Self {
            font_color: font_color.to_string(),
            background_color: background.to_string(),
            ..Self::default()
        }
    }
}

/// Media playback options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Playback {
    /// Restart the video when it ends.
    pub looping: bool,
    /// Playback rate, 1.0 is normal speed.
    pub speed: f64,
}

impl Default for Playback {
    fn default() -> Self {
        Self { looping: false, speed: 1.0 }
    }
}

/// How a media file is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (GIFs included).
    Image,
    /// Video played by the media player.
    Video,
}

impl MediaKind {
    /// Video for `.mp4`, `.avi` and `.mov`, image otherwise.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "avi" | "mov" => Self::Video,
            _ => Self::Image,
        }
    }
}

/// What a display surface is showing.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DisplayContent {
    /// Nothing.
    #[default]
    Blank,
    /// Styled text.
    Text {
        /// Text to show.
        text: String,
        /// Style to show it with.
        style: TextStyle,
    },
    /// An image or video file.
    Media {
        /// Absolute file path.
        path: PathBuf,
        /// Image or video.
        kind: MediaKind,
        /// Playback options (videos only).
        playback: Playback,
    },
}

impl DisplayContent {
    /// Styled text content.
    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self::Text { text: text.into(), style }
    }

    /// Media content; the kind follows the file extension.
    pub fn media(path: impl Into<PathBuf>, playback: Playback) -> Self {
        let path = path.into();
        let kind = MediaKind::for_path(&path);
        Self::Media { path, kind, playback }
    }

    /// The text being shown, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Whether nothing is shown.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

/// Which surface this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SurfaceRole {
    /// Audience-facing output.
    Live,
    /// Operator-facing preview.
    Preview,
}

impl SurfaceRole {
    const fn module(self) -> &'static str {
        match self {
            Self::Live => "LiveOutput",
            Self::Preview => "Preview",
        }
    }
}

/// One display surface.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySurface {
    role: SurfaceRole,
    content: DisplayContent,
    zoom_percent: u16,
    fullscreen: bool,
}

impl DisplaySurface {
    /// A blank surface at 100% zoom.
    pub fn new(role: SurfaceRole) -> Self {
        Self {
            role,
            content: DisplayContent::Blank,
            zoom_percent: ZOOM_DEFAULT_PERCENT,
            fullscreen: false,
        }
    }

    /// Surface role.
    pub fn role(&self) -> SurfaceRole {
        self.role
    }

    /// Current content.
    pub fn content(&self) -> &DisplayContent {
        &self.content
    }

    /// Current zoom in percent.
    pub fn zoom_percent(&self) -> u16 {
        self.zoom_percent
    }

    /// Whether the surface is fullscreen.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Show styled text.
    pub fn set_text(&mut self, text: impl Into<String>, style: TextStyle) {
        self.content = DisplayContent::text(text, style);
        debug!("{}: showing text", self.role.module());
    }

    /// Show a media file. A missing file leaves the surface unchanged.
    pub fn set_media(&mut self, path: &Path, playback: Playback) -> Result<()> {
        if !path.is_file() {
            return Err(Error::model(
                self.role.module(),
                "MEDIA_001",
                format!("Media file not found: {}", path.display()),
            ));
        }
        self.content = DisplayContent::media(path, playback);
        debug!("{}: showing media {}", self.role.module(), path.display());
        Ok(())
    }

    /// Show any content, checking media paths.
    pub fn set_content(&mut self, content: DisplayContent) -> Result<()> {
        match content {
            DisplayContent::Blank => self.clear(),
            DisplayContent::Text { text, style } => self.set_text(text, style),
            DisplayContent::Media { path, playback, .. } => self.set_media(&path, playback)?,
        }
        Ok(())
    }

    /// Blank the surface and reset zoom.
    pub fn clear(&mut self) {
        self.content = DisplayContent::Blank;
        self.zoom_percent = ZOOM_DEFAULT_PERCENT;
        debug!("{}: cleared", self.role.module());
    }

    /// Zoom in one step, up to the maximum.
    pub fn zoom_in(&mut self) -> u16 {
        self.zoom_percent = (self.zoom_percent + ZOOM_STEP_PERCENT).min(ZOOM_MAX_PERCENT);
        self.zoom_percent
    }

    /// Zoom out one step, down to the minimum.
    pub fn zoom_out(&mut self) -> u16 {
        self.zoom_percent = self
            .zoom_percent
            .saturating_sub(ZOOM_STEP_PERCENT)
            .max(ZOOM_MIN_PERCENT);
        self.zoom_percent
    }

    /// Font size after zoom, truncated; `None` unless showing text.
    pub fn effective_font_size(&self) -> Option<u32> {
        match &self.content {
            DisplayContent::Text { style, .. } => {
                let scaled = u64::from(style.font_size) * u64::from(self.zoom_percent) / 100;
                Some(u32::try_from(scaled).unwrap_or(u32::MAX))
            }
            _ => None,
        }
    }

    /// Flip fullscreen, returning the new state.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        self.fullscreen
    }
}

/// The live output and the preview together.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    /// Audience-facing surface.
    pub live: DisplaySurface,
    /// Operator-facing surface.
    pub preview: DisplaySurface,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// Both surfaces blank.
    pub fn new() -> Self {
        Self {
            live: DisplaySurface::new(SurfaceRole::Live),
            preview: DisplaySurface::new(SurfaceRole::Preview),
        }
    }

    /// Stage content on the preview.
    pub fn preview(&mut self, content: DisplayContent) -> Result<()> {
        self.preview.set_content(content)
    }

    /// Send the preview content to the live output.
    pub fn go_live(&mut self) -> Result<()> {
        if self.preview.content().is_blank() {
            return Err(Error::model("LiveOutput", "GO_LIVE_001", "Nothing in preview to send live"));
        }
        self.live.set_content(self.preview.content().clone())?;
        info!("Preview sent to live output");
        Ok(())
    }

    /// Send content straight to the live output.
    pub fn show(&mut self, content: DisplayContent) -> Result<()> {
        self.live.set_content(content)?;
        info!("Content sent to live output");
        Ok(())
    }

    /// Emergency alert: white text on red.
    pub fn alert(&mut self, text: Option<&str>) {
        let style = TextStyle {
            font_size: ALERT_FONT_SIZE,
            ..TextStyle::solid(ALERT_BACKGROUND_COLOR, "#ffffff")
        };
        self.live.set_text(text.unwrap_or(ALERT_TEXT), style);
        info!("Alert shown on live output");
    }

    /// Black screen.
    pub fn black(&mut self) {
        self.live.set_text("", TextStyle::solid("#000000", "#ffffff"));
        info!("Live output set to black");
    }

    /// White screen.
    pub fn white(&mut self) {
        self.live.set_text("", TextStyle::solid("#ffffff", "#000000"));
        info!("Live output set to white");
    }

    /// Show the logo image on the live output.
    pub fn logo(&mut self, path: &Path) -> Result<()> {
        self.live.set_media(path, Playback::default())?;
        info!("Logo shown on live output");
        Ok(())
    }

    /// Whether the live output shows anything.
    pub fn is_live(&self) -> bool {
        !self.live.content().is_blank()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_zoom_is_clamped_and_reset_by_clear() {
        let mut surface = DisplaySurface::new(SurfaceRole::Live);
        assert_eq!(surface.zoom_percent(), 100);
        for _ in 0..20 {
            surface.zoom_in();
        }
        assert_eq!(surface.zoom_percent(), 200);
        for _ in 0..30 {
            surface.zoom_out();
        }
        assert_eq!(surface.zoom_percent(), 50);

        surface.clear();
        assert_eq!(surface.zoom_percent(), 100);
        assert!(surface.content().is_blank());
    }

    #[test]
    fn test_effective_font_size() {
        let mut surface = DisplaySurface::new(SurfaceRole::Preview);
        assert_eq!(surface.effective_font_size(), None);

        surface.set_text("Amazing grace", TextStyle::default());
        assert_eq!(surface.effective_font_size(), Some(18));
        surface.zoom_in();
        surface.zoom_in();
        surface.zoom_in();
        // 18 * 130% = 23.4
        assert_eq!(surface.effective_font_size(), Some(23));
    }

    #[test]
    fn test_effective_font_size_saturates_for_huge_fonts() {
        let mut surface = DisplaySurface::new(SurfaceRole::Live);
        let style = TextStyle { font_size: 40_000_000, ..TextStyle::default() };
        surface.set_text("Big", style);
        surface.zoom_in();
        assert_eq!(surface.effective_font_size(), Some(44_000_000));

        let style = TextStyle { font_size: u32::MAX, ..TextStyle::default() };
        surface.set_text("Bigger", style);
        assert_eq!(surface.effective_font_size(), Some(u32::MAX));
    }

    #[test]
    fn test_set_media_missing_file_keeps_state() {
        let mut surface = DisplaySurface::new(SurfaceRole::Live);
        surface.set_text("still here", TextStyle::default());

        let err = surface
            .set_media(Path::new("/definitely/missing.png"), Playback::default())
            .unwrap_err();
        assert_eq!(err.module(), Some("LiveOutput"));
        assert_eq!(err.code(), Some("MEDIA_001"));
        assert!(matches!(surface.content(), DisplayContent::Text { text, .. } if text == "still here"));
    }

    #[test]
    fn test_media_kind_follows_extension() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("intro.MOV");
        let gif = dir.path().join("loop.gif");
        fs_err::write(&video, b"v").unwrap();
        fs_err::write(&gif, b"g").unwrap();

        let mut surface = DisplaySurface::new(SurfaceRole::Preview);
        surface.set_media(&video, Playback { looping: true, speed: 1.5 }).unwrap();
        assert!(matches!(
            surface.content(),
            DisplayContent::Media { kind: MediaKind::Video, playback: Playback { looping: true, .. }, .. }
        ));
        surface.set_media(&gif, Playback::default()).unwrap();
        assert!(matches!(surface.content(), DisplayContent::Media { kind: MediaKind::Image, .. }));
    }

    #[test]
    fn test_go_live_promotes_preview() {
        let mut stage = Stage::new();
        let err = stage.go_live().unwrap_err();
        assert_eq!(err.code(), Some("GO_LIVE_001"));
        assert!(!stage.is_live());

        stage.preview(DisplayContent::text("Welcome", TextStyle::default())).unwrap();
        assert!(!stage.is_live());
        stage.go_live().unwrap();
        assert!(stage.is_live());
        assert_eq!(stage.live.content(), stage.preview.content());
    }

    #[test]
    fn test_quick_actions() {
        let mut stage = Stage::new();
        stage.alert(None);
        match stage.live.content() {
            DisplayContent::Text { text, style } => {
                assert_eq!(text, ALERT_TEXT);
                assert_eq!(style.background_color, "#e74c3c");
                assert_eq!(style.font_size, 24);
            }
            other => panic!("unexpected content {other:?}"),
        }

        stage.black();
        assert!(matches!(stage.live.content(), DisplayContent::Text { style, .. } if style.background_color == "#000000"));
        stage.white();
        assert!(matches!(stage.live.content(), DisplayContent::Text { style, .. } if style.background_color == "#ffffff"));

        assert!(stage.logo(Path::new("/missing/logo.png")).is_err());
        stage.live.clear();
        assert!(!stage.is_live());
    }

    #[test]
    fn test_toggle_fullscreen() {
        let mut surface = DisplaySurface::new(SurfaceRole::Live);
        assert!(surface.toggle_fullscreen());
        assert!(surface.is_fullscreen());
        assert!(!surface.toggle_fullscreen());
    }

    #[test]
    fn test_content_serializes_tagged() {
        let json = serde_json::to_value(DisplayContent::text("Hi", TextStyle::default())).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["style"]["alignment"], "Centered");
        assert_eq!(serde_json::to_value(DisplayContent::Blank).unwrap()["type"], "blank");
    }
}
