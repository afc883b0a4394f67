use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the `#` is optional, hex digits are case-insensitive).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let trimmed = hex.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |idx: usize| u8::from_str_radix(&digits[idx..idx + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// One transit line as read from its definition file.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub system: String,
    pub id: String,
    pub name: String,
    pub years: String,
    pub color: Rgb,
    pub stations: Vec<String>,
}

impl Line {
    /// Substitutes `{system} {id} {name} {years} {years_paren}` by literal replacement.
    pub fn apply_template(&self, template: &str) -> String {
        let years = self.years.trim();
        let years_paren = if years.is_empty() {
            String::new()
        } else {
            format!(" ({years})")
        };
        template
            .replace("{system}", &self.system)
            .replace("{id}", &self.id)
            .replace("{name}", &self.name)
            .replace("{years_paren}", &years_paren)
            .replace("{years}", years)
    }
}

#[cfg(test)]
pub(crate) fn sample_line(stations: &[&str]) -> Line {
    Line {
        system: "Metro".to_string(),
        id: "North".to_string(),
        name: "Red Line".to_string(),
        years: "1999-2024".to_string(),
        color: Rgb::new(0xD3, 0x2F, 0x2F),
        stations: stations.iter().map(|s| s.to_string()).collect(),
    }
}
