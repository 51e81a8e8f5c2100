use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use super::Loader;
use crate::error::{LegalKgError, Result};

/// Body part of a WordprocessingML package
const DOCUMENT_PART: &str = "word/document.xml";

/// Word-processor (.docx) loader.
///
/// Reads `word/document.xml` from the zip package and flattens it to text:
/// one line per paragraph, text runs concatenated, tabs and breaks kept.
pub struct DocxLoader;

impl Loader for DocxLoader {
    fn can_load(&self, extension: &str) -> bool {
        extension == "docx"
    }

    fn load(&self, path: &Path) -> Result<String> {
        let extraction_error = |reason: String| LegalKgError::Extraction {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| extraction_error(e.to_string()))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| extraction_error(format!("{}: {}", DOCUMENT_PART, e)))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)?;

        document_xml_to_text(&xml).map_err(|e| extraction_error(e.to_string()))
    }
}

/// Flatten WordprocessingML body XML into paragraph lines
pub fn document_xml_to_text(xml: &str) -> std::result::Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" => in_text = true,
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                // Tab stops in paragraph properties are also <w:tab/>; only runs count
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::GeneralRef(e) if in_text => {
                let name = String::from_utf8_lossy(e.as_ref());
                if let Some(c) = resolve_entity(&name) {
                    text.push(c);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
