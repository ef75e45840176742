//! Binary reader for `SchLib` Data streams.
//!
//! This module handles parsing the binary format of Altium `SchLib` Data streams,
//! which contain the primitives (pins, rectangles, lines, etc.) that make up symbols.
//!
//! Every record in the stream starts with a u32 header. The high bit
//! (0x0100_0000) distinguishes a binary pin record (low 24 bits are its
//! byte length) from a textual parameter-string record (the whole u32 is
//! the dword-prefix length of the `KEY=VALUE` string that follows). A
//! record whose `RECORD=` tag isn't one of the known textual types, or
//! whose header matches neither shape, is a fatal error for the
//! surrounding symbol.

use crate::altium::cursor::Cursor;
use crate::altium::error::{AltiumError, AltiumResult};
use crate::altium::params::ParameterList;
use crate::altium::strings::read_u8_prefixed_string;

use super::primitives::{Orientation, Point, SchematicPrimitive};

const BINARY_RECORD_FLAG: u32 = 0x0100_0000;
const RECORD_LENGTH_MASK: u32 = 0x00FF_FFFF;

/// Converts a `KEY`/`KEY_FRAC` pair into a coordinate: `INT*20 + FRAC*20/100000`.
fn coord(params: &ParameterList, key: &str) -> f64 {
    let int_part = params.get_int(key) as f64;
    let frac_part = params.get_int(&format!("{key}_FRAC")) as f64;
    int_part * 20.0 + frac_part * 20.0 / 100_000.0
}

fn point(params: &ParameterList, x_key: &str, y_key: &str) -> Point {
    Point::new(coord(params, x_key), coord(params, y_key))
}

/// Applies the owner-part filter: a record with `OWNERPARTID >= 1` that
/// doesn't match `part` is not part of the part being decoded.
fn owned_by(params: &ParameterList, part: i64) -> bool {
    let owner = params.get_int("OWNERPARTID");
    owner <= 0 || owner == part
}

/// Parses one symbol's Data stream, emitting every primitive belonging to
/// `part` (the part number being decoded; parts are 1-based) via `emit`.
///
/// # Errors
///
/// Returns an error if a record is truncated or its `RECORD=` type is
/// unrecognized.
pub fn parse_data_stream(
    data: &[u8],
    part: i64,
    mut emit: impl FnMut(SchematicPrimitive),
) -> AltiumResult<()> {
    let mut cursor = Cursor::new(data);
    while !cursor.is_empty() {
        let header = cursor.u32()?;
        let length = (header & RECORD_LENGTH_MASK) as usize;
        if header & BINARY_RECORD_FLAG != 0 {
            let payload = cursor.bytes(length)?;
            let pin = parse_binary_pin(payload)?;
            if let SchematicPrimitive::Pin { owner_part, .. } = &pin {
                if *owner_part <= 0 || *owner_part == part {
                    emit(pin);
                }
            }
        } else {
            let payload = cursor.bytes(length)?;
            let raw = String::from_utf8_lossy(payload);
            let params = ParameterList::parse(&raw);
            if owned_by(&params, part) {
                if let Some(primitive) = parse_textual_record(&params)? {
                    emit(primitive);
                }
            }
        }
    }
    Ok(())
}

fn parse_binary_pin(payload: &[u8]) -> AltiumResult<SchematicPrimitive> {
    let mut c = Cursor::new(payload);
    c.u8()?; // record marker, always 1
    c.u32()?; // unused flags dword
    let owner_part = i64::from(c.u32()?);
    c.u8()?;
    c.u8()?;
    c.u8()?;
    let _note = read_u8_prefixed_string(&mut c)?;
    let orientation_byte = c.u8()?;
    c.skip(5)?;
    let length = f64::from(c.i16()?);
    let x = f64::from(c.i16()?);
    let y = f64::from(c.i16()?);
    c.i16()?; // unused
    c.i16()?; // unused
    let label = read_u8_prefixed_string(&mut c)?;
    let number = read_u8_prefixed_string(&mut c)?;
    read_u8_prefixed_string(&mut c)?;
    read_u8_prefixed_string(&mut c)?;
    read_u8_prefixed_string(&mut c)?;

    let orientation = Orientation::from_low_bits(orientation_byte);
    let (dx, dy) = orientation.direction();
    let p2 = Point::new(x * 20.0, y * 20.0);
    let p1 = Point::new(p2.x + dx * length * 20.0, p2.y + dy * length * 20.0);

    Ok(SchematicPrimitive::Pin { p1, p2, label, number, orientation, owner_part })
}

fn vertex_list(params: &ParameterList) -> Vec<Point> {
    let count = params.get_unsigned("LOCATIONCOUNT");
    let mut vertices = Vec::with_capacity(count as usize);
    for i in 1..=count {
        vertices.push(point(params, &format!("X{i}"), &format!("Y{i}")));
    }
    vertices
}

fn parse_textual_record(params: &ParameterList) -> AltiumResult<Option<SchematicPrimitive>> {
    let record = params.get_int("RECORD");
    let primitive = match record {
        1 => {
            // Component header: carries LIBREFERENCE/DESCRIPTION as informational
            // comments rather than a drawable primitive.
            let libref = params.get_string("LIBREFERENCE");
            let description = params.get_string("DESCRIPTION");
            Some(SchematicPrimitive::Text {
                pos: Point::new(0.0, 0.0),
                text: format!("; LIBREFERENCE={libref} DESCRIPTION={description}"),
            })
        }
        3 | 4 => Some(SchematicPrimitive::Text {
            pos: point(params, "X", "Y"),
            text: params.get_string("TEXT"),
        }),
        5 => Some(SchematicPrimitive::Bezier { vertices: vertex_list(params) }),
        6 => Some(SchematicPrimitive::Polyline {
            vertices: vertex_list(params),
            width: coord(params, "LINEWIDTH"),
        }),
        7 => Some(SchematicPrimitive::Polygon {
            vertices: vertex_list(params),
            is_solid: params.get_bool("ISSOLID"),
        }),
        8 => Some(SchematicPrimitive::Ellipse {
            center: point(params, "X", "Y"),
            radius: coord(params, "RADIUS"),
            secondary_radius: coord(params, "SECONDARYRADIUS"),
        }),
        10 => Some(SchematicPrimitive::RoundedRectangle {
            p1: point(params, "X", "Y"),
            p2: point(params, "CORNER.X", "CORNER.Y"),
            corner_x_radius: coord(params, "CORNERXRADIUS"),
            corner_y_radius: coord(params, "CORNERYRADIUS"),
        }),
        11 => Some(SchematicPrimitive::EllipticalArc {
            center: point(params, "X", "Y"),
            radius: coord(params, "RADIUS"),
            secondary_radius: coord(params, "SECONDARYRADIUS"),
            start_deg: params.get_double("STARTANGLE"),
            end_deg: params.get_double("ENDANGLE"),
        }),
        12 => Some(SchematicPrimitive::Arc {
            center: point(params, "X", "Y"),
            radius: coord(params, "RADIUS"),
            start_deg: params.get_double("STARTANGLE"),
            end_deg: params.get_double("ENDANGLE"),
        }),
        13 | 15 => Some(SchematicPrimitive::Line {
            p1: point(params, "X", "Y"),
            p2: point(params, "CORNER.X", "CORNER.Y"),
            width: coord(params, "LINEWIDTH"),
        }),
        14 => Some(SchematicPrimitive::Rectangle {
            p1: point(params, "X", "Y"),
            p2: point(params, "CORNER.X", "CORNER.Y"),
        }),
        34 => Some(SchematicPrimitive::AttributeText {
            name: "Designator".to_string(),
            value: params.get_string("TEXT"),
            is_hidden: params.get_bool("ISHIDDEN"),
        }),
        41 => Some(SchematicPrimitive::AttributeText {
            name: params.get_string("NAME"),
            value: params.get_string("TEXT"),
            is_hidden: params.get_bool("ISHIDDEN"),
        }),
        45 => Some(SchematicPrimitive::AttributeText {
            name: "footprint".to_string(),
            value: params.get_string("MODELNAME"),
            is_hidden: false,
        }),
        44 | 46 | 47 | 48 => None,
        other => {
            return Err(AltiumError::parse_error(0, format!("unknown SchLib record type {other}")));
        }
    };
    Ok(primitive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textual_record(body: &str) -> Vec<u8> {
        let mut out = (body.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(body.as_bytes());
        out
    }

    fn binary_pin(owner_part: u32) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.push(1u8);
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.extend_from_slice(&owner_part.to_le_bytes());
        payload.extend_from_slice(&[0u8, 0u8, 0u8]);
        payload.push(0); // note length 0
        payload.push(0); // orientation byte: Right
        payload.extend_from_slice(&[0u8; 5]);
        payload.extend_from_slice(&100i16.to_le_bytes()); // length
        payload.extend_from_slice(&10i16.to_le_bytes()); // x
        payload.extend_from_slice(&20i16.to_le_bytes()); // y
        payload.extend_from_slice(&0i16.to_le_bytes());
        payload.extend_from_slice(&0i16.to_le_bytes());
        for s in ["1", "A", "", "", ""] {
            payload.push(s.len() as u8);
            payload.extend_from_slice(s.as_bytes());
        }
        let mut record = (BINARY_RECORD_FLAG | payload.len() as u32).to_le_bytes().to_vec();
        record.extend_from_slice(&payload);
        record
    }

    /// S6: a part-2 decode skips an `OWNERPARTID=1` textual record but keeps
    /// a binary pin with `owner_part=0`.
    #[test]
    fn s6_owner_part_filter_scenario() {
        let mut data = textual_record("RECORD=14|OWNERPARTID=1|X=0|Y=0|CORNER.X=100|CORNER.Y=100");
        data.extend(binary_pin(0));

        let mut emitted = Vec::new();
        parse_data_stream(&data, 2, |p| emitted.push(p)).unwrap();

        assert_eq!(emitted.len(), 1);
        assert!(matches!(emitted[0], SchematicPrimitive::Pin { .. }));
    }

    #[test]
    fn owner_part_zero_applies_to_all_parts() {
        let data = textual_record("RECORD=14|OWNERPARTID=0|X=0|Y=0|CORNER.X=100|CORNER.Y=100");
        let mut emitted = Vec::new();
        parse_data_stream(&data, 3, |p| emitted.push(p)).unwrap();
        assert_eq!(emitted.len(), 1);
    }

    #[test]
    fn unknown_record_type_is_fatal() {
        let data = textual_record("RECORD=999");
        let result = parse_data_stream(&data, 1, |_| {});
        assert!(result.is_err());
    }

    #[test]
    fn coordinate_applies_int_frac_formula() {
        let params = ParameterList::parse("X=10|X_FRAC=50000");
        assert_eq!(coord(&params, "X"), 10.0 * 20.0 + 50_000.0 * 20.0 / 100_000.0);
    }

    #[test]
    fn pin_geometry_uses_orientation_direction() {
        let data = binary_pin(0);
        let mut emitted = Vec::new();
        parse_data_stream(&data, 0, |p| emitted.push(p)).unwrap();
        let SchematicPrimitive::Pin { p1, p2, .. } = &emitted[0] else {
            panic!("expected pin");
        };
        assert_eq!(*p2, Point::new(200.0, 400.0));
        assert_eq!(*p1, Point::new(200.0 + 2000.0, 400.0));
    }
}
