use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Taffy error: {0}")]
    Taffy(String),
    #[error("No layout computed for node {0}.")]
    MissingLayout(NodeKey),
}

pub mod engine;
pub mod fonts;
pub mod output;
pub mod solver;
pub mod text;
pub mod tree;

pub use self::engine::compute_layout;
pub use self::fonts::{FontData, FontInstance, FontLibrary};
pub use self::output::{BoxGeometry, LayoutOutput, PlacedFragment, PlacedLine, TextLayout};
pub use self::text::InlineRun;
pub use self::tree::{BoxContent, LayoutBox, NodeKey};
