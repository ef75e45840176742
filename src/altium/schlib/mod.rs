//! Schematic symbol library (`SchLib`) file handling (C8 driver, SchLib
//! side).
//!
//! # File Structure
//!
//! `.SchLib` files are OLE Compound Documents containing:
//!
//! - `FileHeader` — pipe-separated parameters: `HEADER`, `COMPCOUNT`, and
//!   per-component `LIBREF<i>`, `%UTF8%COMPDESCR<i>`, `PARTCOUNT<i>` (the
//!   recorded value is one more than the actual part count).
//! - `SectionKeys` — optional pipe-separated `KEYCOUNT`/`LIBREF<j>`/
//!   `SECTIONKEY<j>` triples, resolving a component's `LIBREF` to its actual
//!   storage name when the two differ.
//! - `<component>/Data` — the component's binary/textual record stream.

pub mod primitives;
pub mod reader;
pub mod writer;

use std::io::{Read, Seek};
use std::path::Path;

use cfb::CompoundFile;
use tracing::{info, warn};

pub use primitives::{Orientation, Point, SchematicPrimitive};

use super::container::{read_stream, translate_resource_name};
use super::error::{AltiumError, AltiumResult};
use super::params::ParameterList;

/// One decoded symbol. Multi-part symbols (ICs with repeated gates) carry
/// one primitive list per part.
#[derive(Debug, Clone, Default)]
pub struct Symbol {
    pub name: String,
    pub description: String,
    pub parts: Vec<Vec<SchematicPrimitive>>,
}

/// A schematic symbol library.
#[derive(Debug, Default)]
pub struct SchLib {
    pub symbols: Vec<Symbol>,
}

struct ComponentEntry {
    libref: String,
    description: String,
    part_count: i64,
}

impl SchLib {
    /// Opens a `.SchLib` file from the given path.
    ///
    /// # Errors
    ///
    /// Returns an error on any fatal condition per §7: a malformed OLE
    /// container, a missing `FileHeader`, or a fatal record-decode failure
    /// in any component.
    pub fn open(path: impl AsRef<Path>) -> AltiumResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| AltiumError::file_read(path, e))?;
        Self::read(file)
    }

    /// Reads a `SchLib` from any reader implementing `Read + Seek`.
    pub fn read<R: Read + Seek>(reader: R) -> AltiumResult<Self> {
        let mut cfb = CompoundFile::open(reader)
            .map_err(|e| AltiumError::invalid_ole(format!("invalid OLE file: {e}")))?;

        let entries = read_file_header(&mut cfb)?;
        let section_keys = read_section_keys(&mut cfb)?;

        let mut symbols = Vec::with_capacity(entries.len());
        for entry in entries {
            let resource = translate_resource_name(&resolve_resource_name(&section_keys, &entry.libref));
            let data_path = format!("{resource}/Data");
            let Ok(data) = read_stream(&mut cfb, &data_path) else {
                warn!(component = %entry.libref, "missing component Data stream, skipping");
                continue;
            };

            let part_count = entry.part_count.max(1);
            let mut parts = Vec::with_capacity(part_count as usize);
            for part in 1..=part_count {
                let mut primitives = Vec::new();
                reader::parse_data_stream(&data, part, |p| primitives.push(p))?;
                parts.push(primitives);
            }

            symbols.push(Symbol { name: entry.libref, description: entry.description, parts });
        }

        info!(count = symbols.len(), "decoded SchLib symbols");
        Ok(Self { symbols })
    }
}

fn read_file_header<R: Read + Seek>(cfb: &mut CompoundFile<R>) -> AltiumResult<Vec<ComponentEntry>> {
    let data = read_stream(cfb, "FileHeader")?;
    if data.len() < 4 {
        return Err(AltiumError::parse_error(0, "FileHeader too short"));
    }
    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < 4 + length {
        return Err(AltiumError::parse_error(4, "FileHeader truncated"));
    }

    let text = String::from_utf8_lossy(&data[4..4 + length]);
    let params = ParameterList::parse(&text);

    if params.contains_key("HEADER") {
        let header = params.get_string("HEADER");
        if !header.contains("Schematic Library") {
            let actual = if header.contains("PCB Library") {
                "PcbLib (PCB Footprint Library)".to_string()
            } else {
                header
            };
            return Err(AltiumError::wrong_file_type("SchLib", actual));
        }
    }

    let comp_count = params.get_unsigned("COMPCOUNT");
    let mut entries = Vec::with_capacity(comp_count as usize);
    for i in 0..comp_count {
        let libref_key = format!("LIBREF{i}");
        if !params.contains_key(&libref_key) {
            continue;
        }
        entries.push(ComponentEntry {
            libref: params.get_string(&libref_key),
            description: params.get_string(&format!("%UTF8%COMPDESCR{i}")),
            part_count: params.get_int(&format!("PARTCOUNT{i}")) - 1,
        });
    }
    Ok(entries)
}

/// Reads the optional `SectionKeys` stream, the same length-prefixed
/// pipe-parameter shape as `FileHeader`. Absence is not fatal: not every
/// library carries one, in which case callers fall back to the bare
/// `LIBREF`.
fn read_section_keys<R: Read + Seek>(cfb: &mut CompoundFile<R>) -> AltiumResult<Option<ParameterList>> {
    let Ok(data) = read_stream(cfb, "SectionKeys") else {
        return Ok(None);
    };
    if data.len() < 4 {
        return Err(AltiumError::parse_error(0, "SectionKeys too short"));
    }
    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < 4 + length {
        return Err(AltiumError::parse_error(4, "SectionKeys truncated"));
    }
    let text = String::from_utf8_lossy(&data[4..4 + length]);
    Ok(Some(ParameterList::parse(&text)))
}

/// Resolves a component's `LIBREF` to its actual OLE storage name via
/// `SectionKeys`: finds the `LIBREF<j>` equal to `libref` and returns its
/// paired `SECTIONKEY<j>`, falling back to `libref` itself if `SectionKeys`
/// is absent or has no matching entry.
fn resolve_resource_name(section_keys: &Option<ParameterList>, libref: &str) -> String {
    let Some(keys) = section_keys else {
        return libref.to_string();
    };
    let key_count = keys.get_unsigned("KEYCOUNT");
    for j in 0..key_count {
        if keys.get_string(&format!("LIBREF{j}")) == libref {
            return keys.get_string(&format!("SECTIONKEY{j}"));
        }
    }
    libref.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_library_has_no_symbols() {
        let lib = SchLib::default();
        assert!(lib.symbols.is_empty());
    }
}
