//! The library-wide Model Table (C4): model-id → normalized model metadata,
//! built once per library before any footprint is decoded.

use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use indexmap::IndexMap;
use tracing::warn;

use super::params::ParameterList;

/// A single normalized model-definition record, as recorded in the
/// library's `Models` sub-container.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub id: String,
    pub rot_x: f64,
    pub rot_y: f64,
    pub rot_z: f64,
    pub d_x: i32,
    pub d_y: i32,
    pub d_z: i32,
    pub checksum: i64,
    pub embed: bool,
    pub filename: String,
}

impl ModelInfo {
    /// Builds a normalized `ModelInfo` from one model-definition parameter
    /// string.
    #[must_use]
    pub fn from_params(params: &ParameterList) -> Self {
        Self {
            id: params.get_string("ID"),
            rot_x: normalize_rotation(params.get_double("ROTX")),
            rot_y: normalize_rotation(params.get_double("ROTY")),
            rot_z: normalize_rotation(params.get_double("ROTZ")),
            d_x: params.get_int("DX") as i32,
            d_y: params.get_int("DY") as i32,
            d_z: params.get_int("DZ") as i32,
            checksum: params.get_int("CHECKSUM"),
            embed: params.get_bool("EMBED"),
            filename: normalize_filename(&params.get_string("NAME")),
        }
    }
}

/// Any rotation axis whose absolute value is within 0.01 of 360.0 is set to
/// 0.0. This debug-visibility heuristic is load-bearing: it feeds directly
/// into the Placement Composer (§4.7).
fn normalize_rotation(v: f64) -> f64 {
    if v.abs() < 0.01 || (v - 360.0).abs() < 0.01 {
        0.0
    } else {
        v
    }
}

/// Splits the recorded path on backslash and keeps the last non-empty
/// component, flattening Windows absolute paths.
fn normalize_filename(raw: &str) -> String {
    raw.split('\\')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

/// string → `ModelInfo`. Duplicate ids are warnings, not errors:
/// first-insertion wins.
#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    models: IndexMap<String, ModelInfo>,
}

impl ModelTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a model, keeping the first insertion on id collision.
    pub fn insert(&mut self, info: ModelInfo) {
        if self.models.contains_key(&info.id) {
            warn!(id = %info.id, "duplicate model id in Models table, keeping first");
            return;
        }
        self.models.insert(info.id.clone(), info);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.models.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Decompresses a ZLIB-compressed STEP payload and writes it to
/// `out_dir/filename`. Failure is logged and swallowed — this is an
/// explicit side effect of Model Table construction, not a fatal error for
/// the library decode.
pub fn extract_step_model(compressed: &[u8], out_dir: &Path, filename: &str) {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut out = Vec::new();
    if let Err(e) = decoder.read_to_end(&mut out) {
        warn!(filename, error = %e, "failed to decompress embedded STEP model, skipping");
        return;
    }
    let path = out_dir.join(filename);
    if let Err(e) = std::fs::write(&path, &out) {
        warn!(path = %path.display(), error = %e, "failed to write extracted STEP model, skipping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S4: ROTX=359.995, ROTZ=90, NAME=C:\parts\foo.step
    #[test]
    fn s4_model_normalization_scenario() {
        let params = ParameterList::parse(r"ROTX=359.995|ROTZ=90|NAME=C:\parts\foo.step");
        let info = ModelInfo::from_params(&params);
        assert_eq!(info.rot_x, 0.0);
        assert_eq!(info.rot_z, 90.0);
        assert_eq!(info.filename, "foo.step");
    }

    #[test]
    fn rotation_normalization_near_zero_and_near_360() {
        assert_eq!(normalize_rotation(0.005), 0.0);
        assert_eq!(normalize_rotation(359.999), 0.0);
        assert_eq!(normalize_rotation(-0.005), 0.0);
        assert_eq!(normalize_rotation(45.0), 45.0);
    }

    #[test]
    fn filename_normalization_strips_windows_path() {
        assert_eq!(normalize_filename(r"C:\a\b\c.step"), "c.step");
        assert_eq!(normalize_filename(r"plain.step"), "plain.step");
        assert_eq!(normalize_filename(r"trailing\\"), "trailing");
    }

    #[test]
    fn duplicate_id_keeps_first() {
        let mut table = ModelTable::new();
        table.insert(ModelInfo {
            filename: "first.step".into(),
            ..ModelInfo::from_params(&ParameterList::parse("ID=M1"))
        });
        table.insert(ModelInfo {
            filename: "second.step".into(),
            ..ModelInfo::from_params(&ParameterList::parse("ID=M1"))
        });
        assert_eq!(table.get("M1").unwrap().filename, "first.step");
        assert_eq!(table.len(), 1);
    }
}
