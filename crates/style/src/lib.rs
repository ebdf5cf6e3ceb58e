pub mod background;
pub mod border;
pub mod color;
pub mod computed;
pub mod flex;
pub mod font;
pub mod length;
pub mod list;
pub mod parsers;
pub mod selector;
pub mod stylesheet;
pub mod text;
pub mod user_agent;

pub use background::{BackgroundImage, BackgroundSize, ColorStop, GradientKind};
pub use border::{BorderSide, BorderStyle};
pub use computed::{BoxSizing, CascadeContext, ComputedStyle, Display, Position, Visibility};
pub use flex::{AlignItems, AlignSelf, FlexDirection, FlexWrap, JustifyContent};
pub use font::{FontStyle, FontWeight};
pub use length::{Edges, Length, LengthContext, LineHeight};
pub use list::ListStyleType;
pub use parsers::StyleParseError;
pub use selector::{Selector, SelectorElement, SelectorList, Specificity};
pub use stylesheet::{Declaration, FontFaceRule, MediaQuery, StyleRule, Stylesheet};
pub use text::{TextAlign, TextDecoration, TextTransform, WhiteSpace};
