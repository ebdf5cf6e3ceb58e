//! Web font loading for one render context.

use vellum_layout::FontLibrary;
use vellum_resource::{fetch, ResourceProvider};
use vellum_style::Stylesheet;

/// Loads every `@font-face` in `sheet` into `fonts`. For each rule the first
/// source that loads and parses wins; a rule with no usable source is logged
/// and the family falls back to the system faces.
pub fn load_web_fonts(fonts: &mut FontLibrary, sheet: &Stylesheet, resources: &dyn ResourceProvider) -> usize {
    let mut loaded = 0;
    for face in &sheet.font_faces {
        let mut registered = false;
        for source in &face.sources {
            match fetch(resources, source) {
                Ok(data) => {
                    if fonts.add_web_font(&face.family, face.weight, face.style, data.as_ref().clone()) > 0 {
                        registered = true;
                        break;
                    }
                    log::warn!("@font-face '{}': no font found in '{}'", face.family, crate::boxes::abbreviate(source));
                }
                Err(e) => log::warn!("@font-face '{}': {}", face.family, e),
            }
        }
        if registered {
            loaded += 1;
        } else {
            log::warn!("@font-face '{}' has no usable source", face.family);
        }
    }
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_resource::InMemoryResourceProvider;

    #[test]
    fn unusable_sources_are_skipped() {
        let sheet = Stylesheet::parse(
            "@font-face { font-family: Brand; src: url(missing.woff2), url(garbage.ttf); }",
        );
        assert_eq!(sheet.font_faces.len(), 1);
        let provider = InMemoryResourceProvider::new().with_asset("garbage.ttf", b"not a font".to_vec());
        let mut fonts = FontLibrary::new();
        assert_eq!(load_web_fonts(&mut fonts, &sheet, &provider), 0);
        assert_eq!(fonts.face_count(), 0);
    }
}
