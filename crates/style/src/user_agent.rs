//! Default element styles applied beneath author stylesheets.

use crate::stylesheet::Stylesheet;
use std::sync::LazyLock;

pub const USER_AGENT_CSS: &str = r#"
html, body, div, section, article, aside, header, footer, main, nav, figure,
figcaption, address, blockquote, details, summary, dl, dt, dd, fieldset, form,
hgroup, hr, legend, ol, ul, p, pre, h1, h2, h3, h4, h5, h6, table, caption,
thead, tbody, tfoot, center {
    display: block;
}
head, script, style, title, meta, link, template, noscript, base, datalist {
    display: none;
}
[hidden] { display: none; }
li { display: list-item; }
img, svg, canvas, video, button, input, select, textarea { display: inline-block; }
tr { display: table-row; }
td, th { display: table-cell; padding: 1px; }
th { font-weight: bold; text-align: center; }

body { margin: 8px; }
p, blockquote, figure, dl, pre { margin-top: 1em; margin-bottom: 1em; }
blockquote, figure { margin-left: 40px; margin-right: 40px; }
dd { margin-left: 40px; }
hr { border: 1px solid gray; margin-top: 0.5em; margin-bottom: 0.5em; }

h1 { font-size: 2em; margin-top: 0.67em; margin-bottom: 0.67em; font-weight: bold; }
h2 { font-size: 1.5em; margin-top: 0.83em; margin-bottom: 0.83em; font-weight: bold; }
h3 { font-size: 1.17em; margin-top: 1em; margin-bottom: 1em; font-weight: bold; }
h4 { font-size: 1em; margin-top: 1.33em; margin-bottom: 1.33em; font-weight: bold; }
h5 { font-size: 0.83em; margin-top: 1.67em; margin-bottom: 1.67em; font-weight: bold; }
h6 { font-size: 0.67em; margin-top: 2.33em; margin-bottom: 2.33em; font-weight: bold; }

ul, ol { margin-top: 1em; margin-bottom: 1em; padding-left: 40px; }
ol { list-style-type: decimal; }
ul ul, ol ul { list-style-type: circle; }
ul ul ul { list-style-type: square; }
li ul, li ol { margin-top: 0; margin-bottom: 0; }

b, strong { font-weight: bolder; }
i, em, cite, var, dfn, address { font-style: italic; }
u, ins { text-decoration: underline; }
s, strike, del { text-decoration: line-through; }
code, kbd, samp, tt, pre { font-family: monospace; }
pre { white-space: pre; }
small { font-size: smaller; }
big { font-size: larger; }
mark { background-color: yellow; color: black; }
a { color: #0000ee; text-decoration: underline; }
sub, sup { font-size: smaller; }
"#;

static USER_AGENT: LazyLock<Stylesheet> = LazyLock::new(|| Stylesheet::parse(USER_AGENT_CSS));

/// The parsed default sheet, shared by every cascade.
pub fn user_agent_stylesheet() -> &'static Stylesheet {
    &USER_AGENT
}
