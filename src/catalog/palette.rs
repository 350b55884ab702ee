//! Fallback colors for primitives that stand in for missing assets

use glam::Vec3;

/// Packed 0xRRGGBB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color)
    }

    /// Linear 0..1 channels.
    pub fn to_vec3(self) -> Vec3 {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        Vec3::new(r, g, b)
    }
}

/// Used when no palette key matches.
pub const DEFAULT_FALLBACK: Color = Color(0xff6b35);

/// Matched in order against the lowercased name; first hit wins.
const PALETTE: &[(&str, Color)] = &[
    ("mushroom", Color(0x8b5e3c)),
    ("pepper", Color(0x2d8a4e)),
    ("olive", Color(0x1a1a2e)),
    ("basil", Color(0x2d8a4e)),
    ("cheese", Color(0xf5c518)),
    ("onion", Color(0xc084fc)),
    ("tomato", Color(0xef4444)),
    ("sauce", Color(0xc0392b)),
    ("dough", Color(0xe8c07d)),
];

/// Case-insensitive substring match of `name` against the palette.
pub fn fallback_color(name: &str) -> Color {
    let lower = name.to_lowercase();
    PALETTE
        .iter()
        .find(|(key, _)| lower.contains(key))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_FALLBACK)
}

/// Resolve an explicit color hint (palette key or hex), falling back to name matching.
pub fn resolve_color(hint: Option<&str>, name: &str) -> Color {
    if let Some(hint) = hint {
        let key = hint.to_lowercase();
        if let Some((_, color)) = PALETTE.iter().find(|(k, _)| *k == key) {
            return *color;
        }
        if let Some(color) = Color::from_hex(hint) {
            return color;
        }
    }
    fallback_color(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_match_is_case_insensitive() {
        assert_eq!(fallback_color("Wild MUSHROOMS"), Color(0x8b5e3c));
        assert_eq!(fallback_color("Kalamata olives"), Color(0x1a1a2e));
    }

    #[test]
    fn test_default_when_no_match() {
        assert_eq!(fallback_color("Pineapple"), DEFAULT_FALLBACK);
        assert_eq!(fallback_color(""), DEFAULT_FALLBACK);
    }

    #[test]
    fn test_first_match_wins() {
        // "pepper" precedes "cheese" in the table
        assert_eq!(fallback_color("Pepper Jack Cheese"), Color(0x2d8a4e));
    }

    #[test]
    fn test_resolve_hint() {
        assert_eq!(resolve_color(Some("Tomato"), "anything"), Color(0xef4444));
        assert_eq!(resolve_color(Some("#102030"), "anything"), Color(0x102030));
        assert_eq!(resolve_color(Some("nonsense"), "red onion"), Color(0xc084fc));
        assert_eq!(resolve_color(None, "basil"), Color(0x2d8a4e));
    }

    #[test]
    fn test_to_vec3() {
        let c = Color(0xff0080).to_vec3();
        assert!((c.x - 1.0).abs() < 1e-6);
        assert!(c.y.abs() < 1e-6);
        assert!((c.z - 128.0 / 255.0).abs() < 1e-6);
    }
}
