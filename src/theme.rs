use ratatui::style::Color;
use serde::Deserialize;

pub fn hex_to_color(hex: &str) -> Color {
    let h = hex.trim_start_matches('#');
    if h.len() != 6 || !h.is_ascii() { return Color::Reset; }
    let r = u8::from_str_radix(&h[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&h[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&h[4..6], 16).unwrap_or(0);
    Color::Rgb(r, g, b)
}

/// Palette read from the `[theme]` table of `config.toml`. Any key left out
/// keeps its Catppuccin Mocha default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub bg:             String,
    pub bg_bar:         String,
    pub bg_popup:       String,
    pub border:         String,
    pub border_focused: String,
    pub text:           String,
    pub text_muted:     String,
    pub accent:         String,
    pub selected_bg:    String,
    pub selected_fg:    String,
    pub done:           String,
    pub warning:        String,
    pub error:          String,
}

impl ThemeConfig {
    pub fn bg(&self)            -> Color { hex_to_color(&self.bg) }
    pub fn bg2(&self)           -> Color { hex_to_color(&self.bg_bar) }
    pub fn popup_bg(&self)      -> Color { hex_to_color(&self.bg_popup) }
    pub fn border(&self)        -> Color { hex_to_color(&self.border) }
    pub fn border_active(&self) -> Color { hex_to_color(&self.border_focused) }
    pub fn fg(&self)            -> Color { hex_to_color(&self.text) }
    pub fn fg_dim(&self)        -> Color { hex_to_color(&self.text_muted) }
    pub fn accent(&self)        -> Color { hex_to_color(&self.accent) }
    pub fn done_color(&self)    -> Color { hex_to_color(&self.done) }
    pub fn warning(&self)       -> Color { hex_to_color(&self.warning) }
    pub fn error(&self)         -> Color { hex_to_color(&self.error) }

    pub fn selected_highlight(&self) -> (Color, Color) {
        (hex_to_color(&self.selected_bg), hex_to_color(&self.selected_fg))
    }
}

impl Default for ThemeConfig {
    fn default() -> Self { Self {
        bg: "#1e1e2e".into(), bg_bar: "#181825".into(), bg_popup: "#313244".into(),
        border: "#45475a".into(), border_focused: "#89b4fa".into(),
        text: "#cdd6f4".into(), text_muted: "#6c7086".into(), accent: "#89b4fa".into(),
        selected_bg: "#89b4fa".into(), selected_fg: "#1e1e2e".into(),
        done: "#a6e3a1".into(), warning: "#f9e2af".into(), error: "#f38ba8".into(),
    }}
}
