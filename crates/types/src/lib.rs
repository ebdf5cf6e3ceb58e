pub mod color;
pub mod geometry;
pub mod slide;
pub mod units;
pub mod xml;

pub use color::Color;
pub use geometry::{Rect, Size};
pub use slide::SlideRecord;
pub use xml::escape_xml;
