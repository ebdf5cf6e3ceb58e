//! Font library for text measurement.
//!
//! `FontLibrary` wraps a `fontdb::Database` behind an `Arc`. Cloning the
//! library is cheap; the first mutation on a clone (loading a web font)
//! copies the database, so faces added by one render context never show up
//! in another.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use vellum_style::font::is_generic_family;
use vellum_style::{FontStyle, FontWeight};

/// A loaded font face with rustybuzz Face creation.
pub struct FontInstance {
    pub data: Arc<Vec<u8>>,
    pub index: u32,
    /// Family name as the face reports it, for renderers that look fonts up by name.
    pub family: String,
}

impl std::fmt::Debug for FontInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontInstance")
            .field("family", &self.family)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontInstance {
    /// Creates a lightweight Face view over the font data.
    pub fn as_face(&self) -> Option<rustybuzz::Face<'_>> {
        rustybuzz::Face::from_slice(&self.data, self.index)
    }
}

pub type FontData = Arc<FontInstance>;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct FontCacheKey {
    families: String,
    weight: u16,
    style: u8,
}

impl FontCacheKey {
    fn new(families: &[String], weight: FontWeight, style: FontStyle) -> Self {
        Self {
            families: families.join(",").to_lowercase(),
            weight: weight.numeric_value(),
            style: match style {
                FontStyle::Normal => 0,
                FontStyle::Italic => 1,
                FontStyle::Oblique => 2,
            },
        }
    }
}

/// A face registered under an `@font-face` family name.
#[derive(Debug, Clone)]
struct WebFace {
    family: String,
    weight: u16,
    italic: bool,
    id: fontdb::ID,
}

#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
    web_faces: Vec<WebFace>,
    cache: Arc<RwLock<HashMap<FontCacheKey, Option<FontData>>>>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.db.len())
            .field("web_faces", &self.web_faces.len())
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
            web_faces: Vec::new(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads the platform's installed fonts.
    pub fn with_system_fonts(mut self, enable: bool) -> Self {
        if enable {
            let db = Arc::make_mut(&mut self.db);
            db.load_system_fonts();
            log::debug!("Loaded {} system font faces", db.len());
        }
        self
    }

    pub fn add_font_dir<P: AsRef<Path>>(&mut self, path: P) {
        Arc::make_mut(&mut self.db).load_fonts_dir(path);
        self.reset_cache();
    }

    /// Adds raw font data under the family names embedded in the font.
    pub fn add_font_data(&mut self, data: Vec<u8>) {
        Arc::make_mut(&mut self.db).load_font_data(data);
        self.reset_cache();
    }

    /// Registers font data under an author-declared family name, the way
    /// `@font-face` does. Returns the number of faces found in the data.
    pub fn add_web_font(&mut self, family: &str, weight: FontWeight, style: FontStyle, data: Vec<u8>) -> usize {
        let db = Arc::make_mut(&mut self.db);
        let before: Vec<fontdb::ID> = db.faces().map(|f| f.id).collect();
        db.load_font_data(data);
        let added: Vec<fontdb::ID> =
            db.faces().map(|f| f.id).filter(|id| !before.contains(id)).collect();
        for id in &added {
            self.web_faces.push(WebFace {
                family: family.to_lowercase(),
                weight: weight.numeric_value(),
                italic: style.is_italic(),
                id: *id,
            });
        }
        log::debug!("Registered {} face(s) for @font-face '{}'", added.len(), family);
        self.reset_cache();
        added.len()
    }

    /// A fresh copy for one render context. The database is shared until
    /// the copy loads something of its own.
    pub fn fork(&self) -> Self {
        Self {
            db: self.db.clone(),
            web_faces: self.web_faces.clone(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        self.db.clone()
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    fn reset_cache(&mut self) {
        self.cache = Arc::new(RwLock::new(HashMap::new()));
    }

    /// Resolves the first family in the list that has a matching face.
    /// `None` means callers fall back to approximate metrics.
    pub fn resolve(&self, families: &[String], weight: FontWeight, style: FontStyle) -> Option<FontData> {
        let key = FontCacheKey::new(families, weight, style);
        if let Ok(cache) = self.cache.read()
            && let Some(hit) = cache.get(&key)
        {
            return hit.clone();
        }

        let found = self.lookup(families, weight, style);
        if found.is_none() {
            log::debug!("No face for {:?} {:?} {:?}", families, weight, style);
        }
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, found.clone());
        }
        found
    }

    fn lookup(&self, families: &[String], weight: FontWeight, style: FontStyle) -> Option<FontData> {
        let id = self
            .web_face(families, weight, style)
            .or_else(|| self.query(families, weight, style))?;
        self.load(id)
    }

    fn web_face(&self, families: &[String], weight: FontWeight, style: FontStyle) -> Option<fontdb::ID> {
        let wanted = weight.numeric_value() as i32;
        families.iter().find_map(|family| {
            let family = family.to_lowercase();
            self.web_faces
                .iter()
                .filter(|f| f.family == family)
                .min_by_key(|f| ((f.weight as i32 - wanted).abs(), f.italic != style.is_italic()))
                .map(|f| f.id)
        })
    }

    fn query(&self, families: &[String], weight: FontWeight, style: FontStyle) -> Option<fontdb::ID> {
        let mut wanted: Vec<fontdb::Family<'_>> = families.iter().map(|f| map_family(f)).collect();
        wanted.push(fontdb::Family::SansSerif);
        self.db.query(&fontdb::Query {
            families: &wanted,
            weight: fontdb::Weight(weight.numeric_value()),
            stretch: fontdb::Stretch::Normal,
            style: map_style(style),
        })
    }

    fn load(&self, id: fontdb::ID) -> Option<FontData> {
        let family = self
            .db
            .face(id)?
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        self.db.with_face_data(id, |data, index| {
            Arc::new(FontInstance { data: Arc::new(data.to_vec()), index, family })
        })
    }
}

fn map_family(name: &str) -> fontdb::Family<'_> {
    if !is_generic_family(name) {
        return fontdb::Family::Name(name);
    }
    match name.to_ascii_lowercase().as_str() {
        "serif" | "ui-serif" => fontdb::Family::Serif,
        "monospace" | "ui-monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::SansSerif,
    }
}

fn map_style(s: FontStyle) -> fontdb::Style {
    match s {
        FontStyle::Normal => fontdb::Style::Normal,
        FontStyle::Italic => fontdb::Style::Italic,
        FontStyle::Oblique => fontdb::Style::Oblique,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_ignores_case() {
        let a = FontCacheKey::new(&["Arial".into()], FontWeight::Bold, FontStyle::Normal);
        let b = FontCacheKey::new(&["arial".into()], FontWeight::Bold, FontStyle::Normal);
        let c = FontCacheKey::new(&["Arial".into()], FontWeight::Regular, FontStyle::Normal);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn empty_library_resolves_nothing() {
        let lib = FontLibrary::new();
        assert_eq!(lib.face_count(), 0);
        assert!(lib.resolve(&["Arial".into()], FontWeight::Regular, FontStyle::Normal).is_none());
    }

    #[test]
    fn forks_do_not_share_web_fonts() {
        let base = FontLibrary::new();
        let mut fork = base.fork();
        // Not a font: nothing is registered, but the fork's database is now its own.
        assert_eq!(fork.add_web_font("Brand", FontWeight::Regular, FontStyle::Normal, vec![0, 1, 2, 3]), 0);
        assert!(!Arc::ptr_eq(&base.db, &fork.db));
        assert!(base.web_faces.is_empty());
    }

    #[test]
    fn generic_families_map_to_fontdb_generics() {
        assert_eq!(map_family("serif"), fontdb::Family::Serif);
        assert_eq!(map_family("system-ui"), fontdb::Family::SansSerif);
        assert_eq!(map_family("Inter"), fontdb::Family::Name("Inter"));
    }
}
