//! How the slide root's background is carried over.

use vellum_style::ComputedStyle;
use vellum_types::Color;

/// Plan for the slide background, decided from the container style alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideBackground {
    /// Native solid slide background.
    Solid(Color),
    /// Gradient or image: the container is rasterized without its content
    /// wrapper into a full-bleed picture.
    Rasterized,
    /// Nothing painted; the master's background shows.
    None,
}

impl SlideBackground {
    pub fn classify(style: &ComputedStyle) -> Self {
        if style.background_image.is_some() {
            return SlideBackground::Rasterized;
        }
        let color = style.background_color;
        if color.is_transparent() {
            SlideBackground::None
        } else if color.is_opaque() {
            SlideBackground::Solid(color)
        } else {
            // Slide backgrounds have no alpha; blend over white.
            SlideBackground::Solid(over_white(color))
        }
    }
}

fn over_white(color: Color) -> Color {
    let a = color.a.clamp(0.0, 1.0);
    let blend = |c: u8| (c as f32 * a + 255.0 * (1.0 - a)).round() as u8;
    Color::rgb(blend(color.r), blend(color.g), blend(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_style::{BackgroundImage, ColorStop, GradientKind};

    #[test]
    fn solid_colors_stay_native() {
        let style = ComputedStyle { background_color: Color::rgb(0x1e, 0x3a, 0x8a), ..Default::default() };
        assert_eq!(SlideBackground::classify(&style), SlideBackground::Solid(Color::rgb(0x1e, 0x3a, 0x8a)));
    }

    #[test]
    fn images_and_gradients_rasterize() {
        let style = ComputedStyle {
            background_color: Color::WHITE,
            background_image: Some(BackgroundImage::Url("bg.png".into())),
            ..Default::default()
        };
        assert_eq!(SlideBackground::classify(&style), SlideBackground::Rasterized);

        let gradient = BackgroundImage::Gradient {
            kind: GradientKind::Linear { angle_deg: 90.0 },
            stops: vec![
                ColorStop { color: Color::BLACK, offset: None },
                ColorStop { color: Color::WHITE, offset: None },
            ],
        };
        let style = ComputedStyle { background_image: Some(gradient), ..Default::default() };
        assert_eq!(SlideBackground::classify(&style), SlideBackground::Rasterized);
    }

    #[test]
    fn transparent_is_none_and_translucent_blends() {
        assert_eq!(SlideBackground::classify(&ComputedStyle::default()), SlideBackground::None);
        let style = ComputedStyle { background_color: Color::rgba(0, 0, 0, 0.5), ..Default::default() };
        assert_eq!(SlideBackground::classify(&style), SlideBackground::Solid(Color::rgb(128, 128, 128)));
    }
}
