//! JSON to ARXML configuration converter.
//!
//! This crate reads a nested JSON configuration tree and converts it into the
//! `CONTAINERS` section of an AUTOSAR ECUC value description:
//!
//! - [`parser`] loads and classifies the input document.
//! - [`converter`] walks the tree and builds the XML element tree.
//! - [`generator`] serializes the element tree to indented ARXML text.
//!
//! The binary `json2arxml` wires the three together.

pub mod converter;
pub mod generator;
pub mod model;
pub mod parser;

pub use converter::{Conversion, Converter, ConverterOptions, IdSource, RandomUuid, convert};
pub use generator::{Element, generate_arxml, write_arxml_file};
pub use model::{Diagnostic, InputDocument, InputNode, ParamKind, SkipReason, TypedValue};
