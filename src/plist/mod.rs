//! Minimal XML property-list writer
//!
//! Covers the value kinds a privacy manifest uses: booleans, strings, arrays
//! and dictionaries. Dictionary entries keep insertion order.

use std::fmt::{self, Write};

pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
pub const DOCTYPE: &str = concat!(
    r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "#,
    r#""http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    Bool(bool),
    String(String),
    Array(Vec<PlistValue>),
    Dict(Vec<(String, PlistValue)>),
}

impl From<bool> for PlistValue {
    fn from(value: bool) -> Self {
        PlistValue::Bool(value)
    }
}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        PlistValue::String(value.to_string())
    }
}

impl From<String> for PlistValue {
    fn from(value: String) -> Self {
        PlistValue::String(value)
    }
}

impl<T: Into<PlistValue>> From<Vec<T>> for PlistValue {
    fn from(values: Vec<T>) -> Self {
        PlistValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Render a complete plist document with `root` as its top-level value
pub fn to_document(root: &PlistValue) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(DOCTYPE);
    out.push('\n');
    out.push_str("<plist version=\"1.0\">\n");
    write_value(&mut out, root, 0).expect("writing to a String cannot fail");
    out.push_str("</plist>\n");
    out
}

fn write_value(out: &mut impl Write, value: &PlistValue, depth: usize) -> fmt::Result {
    let indent = "\t".repeat(depth);
    match value {
        PlistValue::Bool(true) => {
            writeln!(out, "{}<true/>", indent)?;
        }
        PlistValue::Bool(false) => {
            writeln!(out, "{}<false/>", indent)?;
        }
        PlistValue::String(s) => {
            writeln!(out, "{}<string>{}</string>", indent, xml_escape(s))?;
        }
        PlistValue::Array(items) if items.is_empty() => {
            writeln!(out, "{}<array/>", indent)?;
        }
        PlistValue::Array(items) => {
            writeln!(out, "{}<array>", indent)?;
            for item in items {
                write_value(out, item, depth + 1)?;
            }
            writeln!(out, "{}</array>", indent)?;
        }
        PlistValue::Dict(entries) if entries.is_empty() => {
            writeln!(out, "{}<dict/>", indent)?;
        }
        PlistValue::Dict(entries) => {
            writeln!(out, "{}<dict>", indent)?;
            let inner = "\t".repeat(depth + 1);
            for (key, value) in entries {
                writeln!(out, "{}<key>{}</key>", inner, xml_escape(key))?;
                write_value(out, value, depth + 1)?;
            }
            writeln!(out, "{}</dict>", indent)?;
        }
    }
    Ok(())
}

/// Escape the five XML special characters
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
