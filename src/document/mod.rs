//! Markdown document parsing and rendering.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Heading targets whose ids match the outline
//! - Rendering to styled lines, with layout chrome tagged as decoration
//! - Comment markers carried on inline spans

mod parser;
mod types;

pub use parser::{parse, parse_with_layout};
pub use types::{
    Clip, Document, HeadingRef, InlineColor, InlineSpan, InlineStyle, LineType, RenderedLine,
};
