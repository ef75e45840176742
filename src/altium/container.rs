//! Shared OLE container traversal helpers used by both the PcbLib and
//! SchLib library drivers (C8).

use std::io::{Read, Seek};

use cfb::CompoundFile;

use super::error::{AltiumError, AltiumResult};

/// Reads a `<path>` stream's full contents from the compound file.
pub fn read_stream<F: Read + Seek>(cfb: &mut CompoundFile<F>, path: &str) -> AltiumResult<Vec<u8>> {
    let mut stream = cfb
        .open_stream(path)
        .map_err(|_| AltiumError::missing_stream(path.to_string()))?;
    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .map_err(|e| AltiumError::file_read(path, e))?;
    Ok(data)
}

/// Reads a `<path>/Header` stream and returns its u32 count, validating
/// that the stream is exactly 4 bytes.
pub fn read_header_count<F: Read + Seek>(
    cfb: &mut CompoundFile<F>,
    path: &str,
) -> AltiumResult<u32> {
    let data = read_stream(cfb, path)?;
    if data.len() != 4 {
        return Err(AltiumError::invalid_ole(format!(
            "{path} must be exactly 4 bytes, got {}",
            data.len()
        )));
    }
    Ok(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
}

/// Translates a footprint/symbol name into its sibling OLE storage name:
/// `/` becomes `_`, since OLE storage names can't contain `/`.
#[must_use]
pub fn translate_resource_name(name: &str) -> String {
    name.replace('/', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_slash_to_underscore() {
        assert_eq!(translate_resource_name("R0805/SMD"), "R0805_SMD");
        assert_eq!(translate_resource_name("plain"), "plain");
    }
}
