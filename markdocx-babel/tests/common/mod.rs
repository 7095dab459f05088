//! Shared builders for the integration tests: in-memory packages and image sources.

#![allow(dead_code)]

use image::{ImageBuffer, ImageFormat, Rgb};
use markdocx_babel::formats::docx::export::{FetchedImage, ImageFetcher};
use markdocx_babel::formats::docx::package::PackageReader;
use markdocx_babel::{export_markdown, import_docx, ExportOptions, ImportOptions};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture""#
);

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Builds a DOCX package entry by entry.
#[derive(Default)]
pub struct PackageBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(mut self, name: &str, content: impl Into<Vec<u8>>) -> Self {
        self.entries.push((name.to_string(), content.into()));
        self
    }

    /// `word/document.xml` wrapping the given body content
    pub fn body(self, body: &str) -> Self {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NAMESPACES}><w:body>{body}<w:sectPr/></w:body></w:document>"#
        );
        self.part("word/document.xml", xml)
    }

    /// `word/numbering.xml` wrapping the given definitions
    pub fn numbering(self, definitions: &str) -> Self {
        let xml = format!(r#"<w:numbering {NAMESPACES}>{definitions}</w:numbering>"#);
        self.part("word/numbering.xml", xml)
    }

    /// `word/styles.xml` wrapping the given style elements
    pub fn styles(self, styles: &str) -> Self {
        let xml = format!(r#"<w:styles {NAMESPACES}>{styles}</w:styles>"#);
        self.part("word/styles.xml", xml)
    }

    /// `word/_rels/document.xml.rels` from `(id, type, target, external)` tuples
    pub fn relationships(self, rels: &[(&str, &str, &str, bool)]) -> Self {
        let mut xml = format!(r#"<Relationships xmlns="{RELS_NS}">"#);
        for (id, kind, target, external) in rels {
            let mode = if *external { r#" TargetMode="External""# } else { "" };
            xml.push_str(&format!(
                r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"{mode}/>"#
            ));
        }
        xml.push_str("</Relationships>");
        self.part("word/_rels/document.xml.rels", xml)
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &self.entries {
            zip.start_file(name.as_str(), SimpleFileOptions::default())
                .unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}

/// Import a package whose body is `body`, with no other optional parts.
pub fn import_body(body: &str) -> String {
    import(&PackageBuilder::new().body(body).build())
}

pub fn import(bytes: &[u8]) -> String {
    import_docx(bytes, &ImportOptions::default()).unwrap()
}

/// A paragraph holding one plain run
pub fn paragraph(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

/// A numbered paragraph holding one plain run
pub fn list_paragraph(num_id: u32, level: u32, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{level}"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
    )
}

/// An in-memory image source; unknown URLs fail.
#[derive(Default)]
pub struct MemoryFetcher {
    images: HashMap<String, FetchedImage>,
}

impl MemoryFetcher {
    pub fn with(mut self, url: &str, data: Vec<u8>, mime: Option<&str>) -> Self {
        self.images.insert(
            url.to_string(),
            FetchedImage {
                data,
                mime: mime.map(str::to_string),
            },
        );
        self
    }
}

impl ImageFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, String> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| format!("no image registered for {url}"))
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(width, height);
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

pub fn export(markdown: &str) -> Vec<u8> {
    export_with(markdown, &MemoryFetcher::default())
}

pub fn export_with(markdown: &str, fetcher: &MemoryFetcher) -> Vec<u8> {
    export_markdown(markdown, &ExportOptions::default(), fetcher).unwrap()
}

/// Text of a package part
pub fn part_text(bytes: &[u8], name: &str) -> String {
    let mut reader = PackageReader::open(bytes).unwrap();
    reader
        .read_text(name)
        .unwrap()
        .unwrap_or_else(|| panic!("package has no {name}"))
}

/// Values of attribute `attr` on every element named `local`, in document order. Both names
/// are compared without their namespace prefix.
pub fn attribute_values(xml: &str, local: &str, attr: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == local)
        .filter_map(|node| {
            node.attributes()
                .find(|a| a.name() == attr)
                .map(|a| a.value().to_string())
        })
        .collect()
}

/// Number of elements named `local`, prefix ignored
pub fn element_count(xml: &str, local: &str) -> usize {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == local)
        .count()
}

/// Markdown → DOCX → Markdown
pub fn roundtrip(markdown: &str) -> String {
    import(&export(markdown))
}
