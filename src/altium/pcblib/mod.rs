//! `PcbLib` footprint library handling (C8 driver, PcbLib side).
//!
//! # File Structure
//!
//! `.PcbLib` files are OLE Compound Documents containing:
//!
//! - `Library/Header` — u32 count, must be 1.
//! - `Library/Data` — parameter string, footprint count, footprint names.
//! - `Library/Models/Header`, `Library/Models/Data`, `Library/Models/<i>` —
//!   the Model Table and embedded, ZLIB-compressed STEP files.
//! - `<footprint>/Header`, `<footprint>/Data` — one footprint's records.

pub mod primitives;
pub mod reader;
pub mod writer;

use std::io::{Read, Seek};
use std::path::Path;

use cfb::CompoundFile;
use tracing::{info, warn};

pub use primitives::{Coord, FootprintPrimitive, Point};

use super::container::{read_header_count, read_stream, translate_resource_name};
use super::error::{AltiumError, AltiumResult};
use super::model::{extract_step_model, ModelInfo, ModelTable};
use super::params::ParameterList;
use super::strings::{read_dword_prefixed_string, read_multi_prefixed_string};
use crate::altium::cursor::Cursor;

/// One decoded footprint: a name and its ordered primitive list.
#[derive(Debug, Clone, Default)]
pub struct Footprint {
    pub name: String,
    pub primitives: Vec<FootprintPrimitive>,
}

/// A PCB footprint library.
#[derive(Debug, Default)]
pub struct PcbLib {
    pub footprints: Vec<Footprint>,
}

impl PcbLib {
    /// Opens a `.PcbLib` file from the given path, building the Model
    /// Table and decoding every footprint. STEP models are extracted into
    /// `out_dir` (or `.` if none is given).
    ///
    /// # Errors
    ///
    /// Returns an error on any fatal condition per §7: a malformed OLE
    /// container, a `Library/Header` count != 1, or a fatal record-decode
    /// failure in any footprint.
    pub fn open(path: impl AsRef<Path>, out_dir: Option<&Path>) -> AltiumResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| AltiumError::file_read(path, e))?;
        Self::read(file, out_dir.unwrap_or_else(|| Path::new(".")))
    }

    /// Reads a `PcbLib` from any reader implementing `Read + Seek`.
    pub fn read<R: Read + Seek>(reader: R, out_dir: &Path) -> AltiumResult<Self> {
        let mut cfb = CompoundFile::open(reader)
            .map_err(|e| AltiumError::invalid_ole(format!("invalid OLE file: {e}")))?;

        let header_count = read_header_count(&mut cfb, "Library/Header")?;
        if header_count != 1 {
            return Err(AltiumError::unsupported_version(format!(
                "Library/Header count {header_count} != 1"
            )));
        }

        let models = build_model_table(&mut cfb, out_dir)?;

        let data = read_stream(&mut cfb, "Library/Data")?;
        let mut cursor = Cursor::new(&data);
        let _description = read_dword_prefixed_string(&mut cursor)?;
        let footprint_count = cursor.u32()?;
        let mut names = Vec::with_capacity(footprint_count as usize);
        for _ in 0..footprint_count {
            names.push(read_multi_prefixed_string(&mut cursor)?);
        }

        let mut footprints = Vec::with_capacity(names.len());
        for name in names {
            let resource = translate_resource_name(&name);
            let data_path = format!("{resource}/Data");
            let Ok(record_data) = read_stream(&mut cfb, &data_path) else {
                warn!(footprint = %name, "missing footprint Data stream, skipping");
                continue;
            };

            let mut primitives = Vec::new();
            match reader::parse_data_stream(&record_data, &models, |p| primitives.push(p)) {
                Ok(_) => footprints.push(Footprint { name, primitives }),
                Err(e) => return Err(e),
            }
        }

        info!(count = footprints.len(), "decoded PcbLib footprints");
        Ok(Self { footprints })
    }
}

fn build_model_table<R: Read + Seek>(
    cfb: &mut CompoundFile<R>,
    out_dir: &Path,
) -> AltiumResult<ModelTable> {
    let mut table = ModelTable::new();

    let Ok(count) = read_header_count(cfb, "Library/Models/Header") else {
        return Ok(table);
    };

    let data = read_stream(cfb, "Library/Models/Data")?;
    let mut cursor = Cursor::new(&data);
    let mut infos = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let raw = read_dword_prefixed_string(&mut cursor)?;
        let params = ParameterList::parse(&raw);
        infos.push(ModelInfo::from_params(&params));
    }

    for (i, info) in infos.into_iter().enumerate() {
        let step_path = format!("Library/Models/{i}");
        match read_stream(cfb, &step_path) {
            Ok(compressed) => extract_step_model(&compressed, out_dir, &info.filename),
            Err(_) => warn!(index = i, "missing ZLIB model resource, skipping"),
        }
        table.insert(info);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_library_has_no_footprints() {
        let lib = PcbLib::default();
        assert!(lib.footprints.is_empty());
    }
}
