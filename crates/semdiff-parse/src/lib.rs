//! The `Parser` capability for `semdiff`: tree-sitter-backed structural
//! parsing for C#-like source, plus a heuristic line/brace scanner for
//! VB-like and otherwise-unrecognized text.
//!
//! No tree-sitter grammar for VB.NET exists in the ecosystem this crate
//! draws its dependency stack from, so VB (and anything else without a
//! recognized extension) falls back to [`heuristic`]'s scanner — a
//! deliberate, documented choice (see the workspace `DESIGN.md`) rather
//! than a silent gap.

mod csharp;
mod heuristic;

use semdiff::capability::{ParseError, Tree};
use semdiff::Parser as ParserCapability;

/// The `Parser` implementation `semdiff-cli` wires into the core.
#[derive(Default)]
pub struct SemdiffParser;

impl SemdiffParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ParserCapability for SemdiffParser {
    fn parse(&self, text: &str, language_hint: &str) -> Result<Box<dyn Tree>, ParseError> {
        match language_hint.to_ascii_lowercase().as_str() {
            "cs" => csharp::parse(text),
            _ => heuristic::parse(text, language_hint),
        }
    }
}
