use crate::config::DEFAULT_FONT;
use fontdb::{Database, Family, Query, Stretch, Style, Weight, ID};
use std::path::Path;
use std::sync::Arc;

/// Families tried when the requested font and the configured default are both
/// missing.
const FALLBACK_FAMILIES: [&str; 4] = ["Arial", "Liberation Sans", "Helvetica", "DejaVu Sans"];

/// Raw bytes of one face, shared between every style that resolved to it.
#[derive(Debug, Clone)]
pub struct FontData {
    data: Arc<Vec<u8>>,
    index: u32,
}

impl FontData {
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

pub struct FontBook {
    db: Database,
}

impl FontBook {
    pub fn empty() -> Self {
        Self { db: Database::new() }
    }

    pub fn system() -> Self {
        let mut book = Self::empty();
        book.db.load_system_fonts();
        book
    }

    pub fn load_fonts_dir(&mut self, dir: &Path) {
        self.db.load_fonts_dir(dir);
    }

    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    /// Looks a font up by CSS-like family list first, then by PostScript name
    /// (`ArialMT`).
    pub fn resolve(&self, name: &str) -> Option<FontData> {
        let id = self
            .query_families(name)
            .or_else(|| self.query_post_script(name))?;
        self.load(id)
    }

    /// The face used when a requested font is missing.
    pub fn resolve_default(&self) -> Option<FontData> {
        if let Some(face) = self.resolve(DEFAULT_FONT) {
            return Some(face);
        }
        FALLBACK_FAMILIES
            .iter()
            .find_map(|family| self.resolve(family))
            .or_else(|| self.query(&[Family::SansSerif]).and_then(|id| self.load(id)))
            .or_else(|| self.db.faces().next().and_then(|face| self.load(face.id)))
    }

    fn query_families(&self, font_family: &str) -> Option<ID> {
        let names: Vec<&str> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\''))
            .filter(|part| !part.is_empty())
            .collect();
        if names.is_empty() {
            return None;
        }
        let families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" => Family::SansSerif,
                "monospace" => Family::Monospace,
                _ => Family::Name(*name),
            })
            .collect();
        self.query(&families)
    }

    fn query(&self, families: &[Family<'_>]) -> Option<ID> {
        let query = Query {
            families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        self.db.query(&query)
    }

    fn query_post_script(&self, name: &str) -> Option<ID> {
        let name = name.trim();
        self.db
            .faces()
            .find(|face| face.post_script_name.eq_ignore_ascii_case(name))
            .map(|face| face.id)
    }

    fn load(&self, id: ID) -> Option<FontData> {
        self.db
            .with_face_data(id, |data, index| {
                ttf_parser::Face::parse(data, index).ok().map(|_| FontData {
                    data: Arc::new(data.to_vec()),
                    index,
                })
            })
            .flatten()
    }
}
