//! JavaScript rules

mod brace_style;
mod comma_style;
mod eqeqeq;
mod indent;
mod literal_construction;
mod naming_convention;
mod quote_style;
mod semi;

pub use brace_style::BraceStyle;
pub use comma_style::CommaStyle;
pub use eqeqeq::{Eqeqeq, EqeqeqOptions};
pub use indent::Indent;
pub use literal_construction::LiteralConstruction;
pub use naming_convention::{NamingConvention, NamingConventionOptions};
pub use quote_style::{QuoteStyle, QuoteStyleOptions};
pub use semi::Semi;
