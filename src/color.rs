use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_palette(n: usize, hue_offset: f32, saturation: f32, lightness: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = hue_offset + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, saturation, lightness);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    hsl_palette(n, 0.0, 0.75, 0.55)
}

/// Colours for power components: darker, muted and hue-shifted so a
/// component bar never shares a colour with a session line.
pub fn component_palette(n: usize) -> Vec<Color32> {
    hsl_palette(n, 20.0, 0.35, 0.35)
}

// ---------------------------------------------------------------------------
// Color mapping: session label → Color32
// ---------------------------------------------------------------------------

/// Gives every session a stable colour across all charts.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Assign colours in session order.
    pub fn new(sources: &[String]) -> Self {
        let mapping = sources
            .iter()
            .cloned()
            .zip(generate_palette(sources.len()))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a session.
    pub fn color_for(&self, source: &str) -> Color32 {
        self.mapping.get(source).copied().unwrap_or(Color32::GRAY)
    }
}
