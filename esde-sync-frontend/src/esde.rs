use std::fs;
use std::path::Path;

use esde_sync_core::stem::split_file_name;
use esde_sync_core::{CatalogEntry, MetadataField};
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::reader::Reader;

use crate::{Frontend, FrontendError};

/// ES-DE (EmulationStation Desktop Edition) frontend.
pub struct EsDeFrontend;

impl EsDeFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EsDeFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontend for EsDeFrontend {
    fn read_catalog(&self, path: &Path, system: &str) -> Result<Gamelist, FrontendError> {
        read_gamelist(path, system)
    }

    fn render_catalog(&self, provider: Option<&str>, entries: &[&CatalogEntry]) -> String {
        render_gamelist(provider, entries)
    }
}

/// A parsed `gamelist.xml`.
#[derive(Debug, Clone, Default)]
pub struct Gamelist {
    /// The `<provider>` element, verbatim
    pub provider: Option<String>,
    /// One entry per `<game>` with a usable `<path>`, in document order
    pub entries: Vec<CatalogEntry>,
    /// `<game>` records dropped for having no usable `<path>`
    pub skipped_records: usize,
}

impl Gamelist {
    /// Number of `<game>` records in the document.
    pub fn total_records(&self) -> usize {
        self.entries.len() + self.skipped_records
    }
}

/// Read and parse a gamelist file.
pub fn read_gamelist(path: &Path, system: &str) -> Result<Gamelist, FrontendError> {
    let text = fs::read_to_string(path)?;
    parse_gamelist(&text, system)
}

#[derive(Default)]
struct GameRecord {
    start: usize,
    fields: Vec<MetadataField>,
    open: Option<(String, String)>,
}

/// Parse gamelist XML.
///
/// Every `<game>` becomes a [`CatalogEntry`] keyed by the stem of its
/// `<path>`; the record text is kept in `raw_record` so it can be written
/// back untouched. Direct children become fields; deeper nesting is kept
/// only in the raw text.
pub fn parse_gamelist(text: &str, system: &str) -> Result<Gamelist, FrontendError> {
    let mut xml = Reader::from_reader(text.as_bytes());
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut gamelist = Gamelist::default();
    let mut saw_root = false;
    let mut depth = 0usize;
    let mut provider_start: Option<usize> = None;
    let mut game: Option<GameRecord> = None;

    loop {
        let event_start = xml.buffer_position() as usize;
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                depth += 1;
                let tag = tag_name(e.name());
                match (depth, tag.as_str()) {
                    (1, "gameList") => saw_root = true,
                    (2, "game") => {
                        game = Some(GameRecord {
                            start: event_start,
                            ..GameRecord::default()
                        })
                    }
                    (2, "provider") => provider_start = Some(event_start),
                    (3, _) => {
                        if let Some(ref mut record) = game {
                            record.open = Some((tag.clone(), String::new()));
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                let tag = tag_name(e.name());
                match (depth, tag.as_str()) {
                    (0, "gameList") => saw_root = true,
                    (1, "game") => gamelist.skipped_records += 1,
                    (2, _) => {
                        if let Some(ref mut record) = game {
                            record.fields.push(MetadataField {
                                name: tag.clone(),
                                value: String::new(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if depth == 3 {
                    if let Some((_, value)) = game.as_mut().and_then(|g| g.open.as_mut()) {
                        value.push_str(&e.unescape()?);
                    }
                }
            }
            Event::CData(ref e) => {
                if depth == 3 {
                    if let Some((_, value)) = game.as_mut().and_then(|g| g.open.as_mut()) {
                        value.push_str(&String::from_utf8_lossy(e));
                    }
                }
            }
            Event::End(ref e) => {
                let end = xml.buffer_position() as usize;
                let tag = tag_name(e.name());
                match (depth, tag.as_str()) {
                    (3, _) => {
                        if let Some(ref mut record) = game {
                            if let Some((name, value)) = record.open.take() {
                                record.fields.push(MetadataField { name, value });
                            }
                        }
                    }
                    (2, "game") => {
                        if let Some(record) = game.take() {
                            let raw = text[record.start..end].trim();
                            match entry_from_record(system, record.fields, raw) {
                                Some(entry) => gamelist.entries.push(entry),
                                None => gamelist.skipped_records += 1,
                            }
                        }
                    }
                    (2, "provider") => {
                        if let Some(start) = provider_start.take() {
                            gamelist.provider = Some(text[start..end].trim().to_string());
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof if depth > 0 => {
                return Err(FrontendError::invalid_gamelist("unexpected end of document"));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(FrontendError::invalid_gamelist("no <gameList> root element"));
    }

    Ok(gamelist)
}

fn tag_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).to_string()
}

fn entry_from_record(system: &str, fields: Vec<MetadataField>, raw: &str) -> Option<CatalogEntry> {
    let path = fields.iter().find(|f| f.name == "path")?;
    let stem = stem_from_path(&path.value)?;
    let display_name = fields
        .iter()
        .find(|f| f.name == "name" && !f.value.trim().is_empty())
        .map(|f| f.value.trim().to_string())
        .unwrap_or_else(|| stem.clone());

    let mut entry = CatalogEntry::new(system, stem).with_display_name(display_name);
    entry.fields = fields;
    entry.raw_record = Some(raw.to_string());
    Some(entry)
}

/// Stem of a gamelist `<path>` value: `./Celeste.xci` -> `Celeste`.
///
/// Only the final path segment counts, so ROMs kept in sub-folders are
/// matched by file name alone.
pub fn stem_from_path(path_text: &str) -> Option<String> {
    let normalized = path_text.trim().replace('\\', "/");
    let file_name = normalized.rsplit('/').next().unwrap_or("");
    let (stem, _) = split_file_name(file_name);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// Render a gamelist holding `entries` in the order given.
///
/// Entries read from a master are written back from their raw record text;
/// others are rendered from their fields.
pub fn render_gamelist(provider: Option<&str>, entries: &[&CatalogEntry]) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\"?>\n");
    xml.push_str("<gameList>\n");

    if let Some(provider) = provider {
        push_record(&mut xml, provider);
    }

    for entry in entries {
        match entry.raw_record {
            Some(ref raw) => push_record(&mut xml, raw),
            None => write_game(&mut xml, entry),
        }
    }

    xml.push_str("</gameList>\n");
    xml
}

fn push_record(xml: &mut String, raw: &str) {
    xml.push('\t');
    xml.push_str(raw);
    xml.push('\n');
}

fn write_game(xml: &mut String, entry: &CatalogEntry) {
    xml.push_str("\t<game>\n");
    if entry.field("name").is_none() {
        write_tag(xml, "name", &entry.display_name);
    }
    for field in &entry.fields {
        write_tag(xml, &field.name, &field.value);
    }
    xml.push_str("\t</game>\n");
}

fn write_tag(xml: &mut String, tag: &str, value: &str) {
    xml.push_str("\t\t<");
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(&escape_xml(value));
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
#[path = "tests/esde_tests.rs"]
mod tests;
