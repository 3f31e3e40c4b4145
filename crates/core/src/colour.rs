/// Normalised RGBA colour (each channel in `[0.0, 1.0]`).
///
/// The sampler never interprets colours; they are carried through to the
/// rendering collaborator with the rest of the [`GraphStyle`](crate::GraphStyle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Colour {
    pub const DARK_GRAY:   Self = Self { r: 0.663, g: 0.663, b: 0.663, a: 1.0 }; // #a9a9a9
    pub const LIGHT_GRAY:  Self = Self { r: 0.827, g: 0.827, b: 0.827, a: 1.0 }; // #d3d3d3
    pub const TRANSPARENT: Self = Self { r: 0.0,   g: 0.0,   b: 0.0,   a: 0.0 };

    /// Parse a colour setting: `#RRGGBB`, `#RRGGBBAA`, or one of the named
    /// panel defaults (`"dark gray"`, `"light gray"`, `"transparent"`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }
        match value.to_ascii_lowercase().as_str() {
            "dark gray" | "dark grey" | "darkgray" | "darkgrey" => Some(Self::DARK_GRAY),
            "light gray" | "light grey" | "lightgray" | "lightgrey" => Some(Self::LIGHT_GRAY),
            "transparent" => Some(Self::TRANSPARENT),
            _ => None,
        }
    }

    /// Parse a CSS-style hex colour string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| -> Option<f32> { u8::from_str_radix(s, 16).ok().map(|b| b as f32 / 255.0) };

        match hex.len() {
            6 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: 1.0,
            }),
            8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }
}
