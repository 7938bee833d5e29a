//! ARXML output – the in-memory XML tree and its serializer.
//!
//! This module provides:
//! - [`element`] – The [`Element`] tree built by the converter.
//! - [`arxml`] – Generate indented XML text from an [`Element`] and write it to disk.

pub mod arxml;
pub mod element;

pub use arxml::{DEFAULT_INDENT, generate_arxml, write_arxml_file};
pub use element::Element;
