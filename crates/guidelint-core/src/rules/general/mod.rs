//! Rules that apply to every language

mod trailing_newline;

pub use trailing_newline::TrailingNewline;
