//! CSS rules

mod declaration_order;
mod indent;

pub use declaration_order::{Category, DeclarationOrder, DeclarationOrderOptions};
pub use indent::CssIndent;
