// Small nom parsers for the string-typed fields of chart configs

pub mod color;
pub mod lexer;

// Public API re-exports
pub use color::{parse_color, translucent, Rgba};
