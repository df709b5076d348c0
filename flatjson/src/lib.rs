// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), no_std)]

mod error;
pub use error::ParseStatus;

mod tokenizer;

mod node;
pub use node::{Node, NodeKind, NodeRef, Siblings};

mod parser;
pub use parser::Parser;

mod path;
pub use path::resolve;

mod doc;
pub use doc::FlatDoc;

// Span-level conversions, usable on their own
mod convert;
pub use convert::{
    f32_from_hex, f32_to_hex, f64_from_hex, f64_to_hex, from_ascii_i64, from_ascii_u64, unescape,
    unescape_into, unescaped_len, utf8_len, HexF32, HexF64, Unescape,
};
