use models::ChartPalette;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeId {
    #[default]
    Light,
    Dark,
    Forest,
}

impl ThemeId {
    pub const ALL: [ThemeId; 3] = [ThemeId::Light, ThemeId::Dark, ThemeId::Forest];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Light => "light",
            ThemeId::Dark => "dark",
            ThemeId::Forest => "forest",
        }
    }

    /// Parses an identifier, falling back to the default theme when it is not recognised.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(theme = raw, "unknown theme, using default");
            ThemeId::default()
        })
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTheme(pub String);

impl fmt::Display for UnknownTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme: {}", self.0)
    }
}

impl std::error::Error for UnknownTheme {}

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ThemeId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

/// Named colour tokens of one theme, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub id: ThemeId,
    pub tokens: Vec<(&'static str, &'static str)>,
}

impl Theme {
    pub fn token(&self, name: &str) -> Option<&'static str> {
        self.tokens.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    /// `:root { --name: value; ... }` block applying the tokens as global variables.
    pub fn css_variables(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.tokens {
            css.push_str(&format!("  --{}: {};\n", name, value));
        }
        css.push('}');
        css
    }

    pub fn chart_palette(&self) -> ChartPalette {
        let pick = |name: &str| self.token(name).unwrap_or("#999999").to_string();
        ChartPalette {
            series: ["series-1", "series-2", "series-3", "series-4"]
                .into_iter()
                .filter_map(|n| self.token(n).map(str::to_string))
                .collect(),
            positive: pick("positive"),
            negative: pick("negative"),
            fixed: pick("fixed"),
            variable: pick("variable"),
            neutral: pick("neutral"),
        }
    }
}

pub fn theme(id: ThemeId) -> Theme {
    let tokens = match id {
        ThemeId::Light => vec![
            ("background", "#ffffff"),
            ("surface", "#f6f8fa"),
            ("text", "#1f2328"),
            ("accent", "#0969da"),
            ("positive", "#1a7f37"),
            ("negative", "#cf222e"),
            ("fixed", "#bc4c00"),
            ("variable", "#9a6700"),
            ("neutral", "#d0d7de"),
            ("series-1", "#0969da"),
            ("series-2", "#8250df"),
            ("series-3", "#1b7c83"),
            ("series-4", "#bf3989"),
        ],
        ThemeId::Dark => vec![
            ("background", "#0d1117"),
            ("surface", "#161b22"),
            ("text", "#e6edf3"),
            ("accent", "#2f81f7"),
            ("positive", "#3fb950"),
            ("negative", "#f85149"),
            ("fixed", "#db6d28"),
            ("variable", "#d29922"),
            ("neutral", "#30363d"),
            ("series-1", "#2f81f7"),
            ("series-2", "#a371f7"),
            ("series-3", "#39c5cf"),
            ("series-4", "#db61a2"),
        ],
        ThemeId::Forest => vec![
            ("background", "#f4f1e8"),
            ("surface", "#e7e2d3"),
            ("text", "#2d3a2e"),
            ("accent", "#4a7c59"),
            ("positive", "#4a7c59"),
            ("negative", "#a23e48"),
            ("fixed", "#c17c3a"),
            ("variable", "#b59f3b"),
            ("neutral", "#cfc8b4"),
            ("series-1", "#4a7c59"),
            ("series-2", "#6b8f71"),
            ("series-3", "#8c6a4f"),
            ("series-4", "#3f6c8a"),
        ],
    };
    Theme { id, tokens }
}

pub fn catalogue() -> Vec<Theme> {
    ThemeId::ALL.into_iter().map(theme).collect()
}
