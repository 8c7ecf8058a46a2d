//! Hex colour strings used by colorpicker options

/// Parsed colour. Accepts `RRGGBB` or `AARRGGBB`, with or without `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl HexColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let hex = input.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// `#rrggbb`, the form colorpicker values are stored in
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Alpha from a 0..=1 transparency value, where 1 is fully opaque
    pub fn with_transparency(mut self, transparency: f64) -> Self {
        self.a = (transparency.clamp(0.0, 1.0) * 255.0).round() as u8;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        assert_eq!(HexColor::parse("#60cdff"), Some(HexColor::rgb(0x60, 0xcd, 0xff)));
        assert_eq!(HexColor::parse("FF0000"), Some(HexColor::rgb(255, 0, 0)));
    }

    #[test]
    fn test_parse_argb() {
        let color = HexColor::parse("#7F000000").unwrap();
        assert_eq!(color.a, 0x7F);
        assert_eq!(color.to_hex(), "#000000");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(HexColor::parse("#12"), None);
        assert_eq!(HexColor::parse("#gg0000"), None);
        assert_eq!(HexColor::parse("#ééé"), None);
    }

    #[test]
    fn test_with_transparency() {
        let color = HexColor::rgb(1, 2, 3).with_transparency(0.4);
        assert_eq!(color.a, 102);
    }
}
