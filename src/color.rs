use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.6);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fixed colours for the known subgroups
// ---------------------------------------------------------------------------

/// Colour of a stratification or region label, if it is one of the known ones.
pub fn fixed_color(key: &str) -> Option<Color32> {
    let c = match key {
        "Black, non-Hispanic" => Color32::from_rgb(0x44, 0x72, 0xc4),
        "White, non-Hispanic" => Color32::from_rgb(0xf1, 0xb7, 0xa3),
        "Hispanic" => Color32::from_rgb(0xc5, 0xe0, 0xb4),
        "Other, non-Hispanic" => Color32::from_rgb(0xc8, 0xa7, 0xed),
        "Male" => Color32::from_rgb(0x7e, 0xc8, 0xe3),
        "Female" => Color32::from_rgb(0xf5, 0xa3, 0xc7),
        "Midwest" => Color32::from_rgb(0x4e, 0x79, 0xa7),
        "South" => Color32::from_rgb(0xe1, 0x57, 0x59),
        "Northeast" => Color32::from_rgb(0xf2, 0x8e, 0x2b),
        "West" => Color32::from_rgb(0x76, 0xb7, 0xb2),
        _ => return None,
    };
    Some(c)
}

/// Colours for the six series of the stacked area chart.
const SERIES_COLORS: [Color32; 6] = [
    Color32::from_rgb(0xea, 0x8d, 0x4e),
    Color32::from_rgb(0xe0, 0x61, 0x53),
    Color32::from_rgb(0x91, 0x6f, 0xdf),
    Color32::from_rgb(0x37, 0xb9, 0x9c),
    Color32::from_rgb(0xe0, 0xb4, 0x48),
    Color32::from_rgb(0xb8, 0xc1, 0x48),
];

// ---------------------------------------------------------------------------
// Color mapping: group key → Color32
// ---------------------------------------------------------------------------

/// Maps the group keys of a chart to distinct colours.
///
/// Known subgroups keep their fixed colour across charts; other keys take
/// the series colours in key order, then generated hues.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given ordered keys.
    pub fn new(keys: &[String]) -> Self {
        let unknown = keys.iter().filter(|k| fixed_color(k).is_none()).count();
        let mut spare: Vec<Color32> = if unknown <= SERIES_COLORS.len() {
            SERIES_COLORS[..unknown].to_vec()
        } else {
            generate_palette(unknown)
        };
        spare.reverse();

        let mapping = keys
            .iter()
            .map(|k| {
                let color = fixed_color(k)
                    .or_else(|| spare.pop())
                    .unwrap_or(Color32::GRAY);
                (k.clone(), color)
            })
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given key.
    pub fn color_for(&self, key: &str) -> Color32 {
        self.mapping
            .get(key)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_keep_fixed_colours() {
        let map = ColorMap::new(&["Male".to_string(), "Some question".to_string()]);
        assert_eq!(map.color_for("Male"), Color32::from_rgb(0x7e, 0xc8, 0xe3));
        assert_eq!(map.color_for("Some question"), SERIES_COLORS[0]);
        assert_eq!(map.color_for("absent"), Color32::GRAY);
    }

    #[test]
    fn palette_is_distinct() {
        let p = generate_palette(8);
        assert_eq!(p.len(), 8);
        assert_ne!(p[0], p[4]);
    }
}
