//! Theme and palette resolution.
//!
//! Both lookups are total: unrecognized identifiers fall back to
//! [`Theme::Modern`] and [`Palette::Purple`], so the synthesizer always
//! receives a valid [`VisualConfig`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Modern,
    Minimal,
    Corporate,
    Vibrant,
    Dark,
    Nature,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Modern,
        Theme::Minimal,
        Theme::Corporate,
        Theme::Vibrant,
        Theme::Dark,
        Theme::Nature,
    ];

    /// Case-insensitive lookup; unknown ids resolve to the default.
    pub fn parse(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.id().eq_ignore_ascii_case(id.trim()))
            .unwrap_or_default()
    }

    pub fn id(&self) -> &'static str {
        match self {
            Theme::Modern => "modern",
            Theme::Minimal => "minimal",
            Theme::Corporate => "corporate",
            Theme::Vibrant => "vibrant",
            Theme::Dark => "dark",
            Theme::Nature => "nature",
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            Theme::Modern => "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
            Theme::Minimal => "linear-gradient(135deg, #e0e0e0 0%, #f5f5f5 100%)",
            Theme::Corporate => "linear-gradient(135deg, #1e3c72 0%, #2a5298 100%)",
            Theme::Vibrant => "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
            Theme::Dark => "linear-gradient(135deg, #0f2027 0%, #2c5364 100%)",
            Theme::Nature => "linear-gradient(135deg, #134e5e 0%, #71b280 100%)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    #[default]
    Purple,
    Ocean,
    Sunset,
    Forest,
    Coral,
    Midnight,
}

impl Palette {
    pub const ALL: [Palette; 6] = [
        Palette::Purple,
        Palette::Ocean,
        Palette::Sunset,
        Palette::Forest,
        Palette::Coral,
        Palette::Midnight,
    ];

    /// Case-insensitive lookup; unknown ids resolve to the default.
    pub fn parse(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.id().eq_ignore_ascii_case(id.trim()))
            .unwrap_or_default()
    }

    pub fn id(&self) -> &'static str {
        match self {
            Palette::Purple => "purple",
            Palette::Ocean => "ocean",
            Palette::Sunset => "sunset",
            Palette::Forest => "forest",
            Palette::Coral => "coral",
            Palette::Midnight => "midnight",
        }
    }

    /// `(primary, secondary)` colors.
    pub fn colors(&self) -> (&'static str, &'static str) {
        match self {
            Palette::Purple => ("#6A4C93", "#9370DB"),
            Palette::Ocean => ("#2C8B8B", "#48C9B0"),
            Palette::Sunset => ("#FF6B9D", "#FFA07A"),
            Palette::Forest => ("#134E5E", "#71B280"),
            Palette::Coral => ("#FF6B6B", "#FF8C8C"),
            Palette::Midnight => ("#2C3E50", "#34495E"),
        }
    }
}

/// Concrete colors used by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualConfig {
    pub background_gradient: String,
    pub primary_color: String,
    pub secondary_color: String,
}

pub fn resolve(theme: Theme, palette: Palette) -> VisualConfig {
    let (primary, secondary) = palette.colors();
    VisualConfig {
        background_gradient: theme.background().to_string(),
        primary_color: primary.to_string(),
        secondary_color: secondary.to_string(),
    }
}

/// Resolves identifiers to a visual configuration, never failing.
pub fn resolve_visual(theme_id: &str, palette_id: &str) -> VisualConfig {
    resolve(Theme::parse(theme_id), Palette::parse(palette_id))
}
