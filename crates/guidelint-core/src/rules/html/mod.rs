//! HTML rules

mod attribute_order;
mod attribute_quotes;
mod indent;

pub use attribute_order::{AttributeOrder, AttributeOrderOptions};
pub use attribute_quotes::AttributeQuotes;
pub use indent::HtmlIndent;
