//! Manifest document access
//!
//! Global invariants enforced:
//! - Element lookups search all descendants, excluding the node itself
//! - A shape mismatch yields `None`, never an error

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use roxmltree::{Document, Node, ParsingOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Manifest file name inside an export directory
pub const MANIFEST_FILE: &str = "archive_manifest.xml";

/// Summary page file name inside an export directory
pub const INDEX_FILE: &str = "index.html";

pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

pub fn index_path(root: &Path) -> PathBuf {
    root.join(INDEX_FILE)
}

/// Read the manifest text, failing when the export has none
pub fn read_manifest(root: &Path) -> Result<String> {
    let path = manifest_path(root);
    if !path.is_file() {
        anyhow::bail!(
            "Error \"{}\" does not exist.  Did you type the correct directory?",
            path.display()
        );
    }
    let bytes = std::fs::read(&path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    Ok(decode_manifest(&bytes))
}

/// Decode manifest bytes to text
///
/// A byte order mark wins, then the `encoding` of the XML declaration, then
/// UTF-8. Malformed sequences become U+FFFD.
pub fn decode_manifest(bytes: &[u8]) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| sniff_utf16(bytes))
        .or_else(|| {
            // A declaration readable as ASCII rules out UTF-16
            declared_encoding(bytes)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
                .map(Encoding::output_encoding)
        })
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("manifest contains bytes that are not valid {}", used.name());
    }
    text.into_owned()
}

/// UTF-16 without a byte order mark, recognized by its `<?` prefix
fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    match bytes.get(..4)? {
        [b'<', 0, b'?', 0] => Some(UTF_16LE),
        [0, b'<', 0, b'?'] => Some(UTF_16BE),
        _ => None,
    }
}

/// `encoding` pseudo-attribute of an ASCII-compatible XML declaration
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    if !bytes.starts_with(b"<?xml") {
        return None;
    }
    let end = bytes.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&bytes[..end]).ok()?;
    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    Some(value[..value.find(quote)?].to_string())
}

/// Parse manifest text into a document tree
pub fn parse_manifest(text: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, options).context("failed to parse manifest XML")
}

/// Descendant elements of `node` with the given tag name, in document order
pub fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| *n != node && n.is_element() && n.tag_name().name() == name)
}

/// Text of the single `name` element holding exactly one text node
pub fn scalar(node: Node<'_, '_>, name: &str) -> Option<String> {
    let mut matches = elements(node, name);
    let element = matches.next()?;
    if matches.next().is_some() {
        return None;
    }

    let mut children = element.children();
    let child = children.next()?;
    if children.next().is_some() || !child.is_text() {
        return None;
    }
    child.text().map(str::to_string)
}

/// Every `name` element rendered as "Last, First"
///
/// A missing first or last name leaves that half blank rather than dropping
/// the person.
pub fn people(node: Node<'_, '_>, name: &str) -> Vec<String> {
    elements(node, name)
        .map(|person| {
            let first = scalar(person, "first-name").unwrap_or_default();
            let last = scalar(person, "last-name").unwrap_or_default();
            format!("{}, {}", last, first)
        })
        .collect()
}

/// Value of the first custom field whose name matches case-insensitively
pub fn custom_field(node: Node<'_, '_>, field_name: &str) -> Option<String> {
    let wanted = field_name.to_lowercase();
    elements(node, "custom-field-value")
        .find(|field| {
            field
                .attribute("field-name")
                .is_some_and(|name| !name.is_empty() && name.to_lowercase() == wanted)
        })
        .and_then(|field| field.attribute("field-value"))
        .map(str::to_string)
}
