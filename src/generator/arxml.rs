//! Generate ARXML text from an [`Element`] tree.
//!
//! The output starts with an XML declaration and puts one element per line,
//! indented by a fixed number of spaces per nesting level. Elements that only
//! carry text are written inline, empty elements are self-closing.

use super::element::Element;
use anyhow::{Context, Result};
use camino::Utf8Path;
use quick_xml::escape::escape;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Spaces per nesting level.
pub const DEFAULT_INDENT: usize = 2;

/// Generate the XML text for `root`, including the XML declaration.
pub fn generate_arxml(root: &Element, indent_width: usize) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    write_element(&mut out, root, 0, indent_width);
    out
}

/// Serialize `root` and write it to `path`, replacing any existing file.
pub fn write_arxml_file(root: &Element, indent_width: usize, path: &Utf8Path) -> Result<()> {
    let xml = generate_arxml(root, indent_width);
    let file =
        File::create(path.as_std_path()).with_context(|| format!("Failed to create {}", path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(xml.as_bytes())
        .with_context(|| format!("Failed to write {}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path))?;
    tracing::debug!(path = %path, bytes = xml.len(), "wrote ARXML");
    Ok(())
}

fn indent(out: &mut String, level: usize, width: usize) {
    for _ in 0..level * width {
        out.push(' ');
    }
}

/// Escape text content. Carriage returns are encoded as character references,
/// otherwise XML line-end normalization turns them into `\n`.
fn escape_text(s: &str) -> String {
    escape(s).replace('\r', "&#xD;")
}

/// Escape an attribute value. Like [`escape_text`] but newlines are encoded
/// too, so they survive attribute normalization.
fn escape_attr(s: &str) -> String {
    escape_text(s).replace('\n', "&#xA;")
}

fn write_element(out: &mut String, el: &Element, level: usize, width: usize) {
    indent(out, level, width);
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attributes {
        out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value)));
    }

    let text = el.text.as_deref().filter(|t| !t.is_empty());
    match (text, el.children.is_empty()) {
        (None, true) => out.push_str("/>\n"),
        (Some(text), true) => {
            out.push_str(&format!(">{}</{}>\n", escape_text(text), el.name));
        }
        (text, false) => {
            out.push_str(">\n");
            if let Some(text) = text {
                indent(out, level + 1, width);
                out.push_str(&escape_text(text));
                out.push('\n');
            }
            for child in &el.children {
                write_element(out, child, level + 1, width);
            }
            indent(out, level, width);
            out.push_str(&format!("</{}>\n", el.name));
        }
    }
}
