//! Text sink for decoded symbols: writes one `<symbol>-<part>.sym` element
//! list per symbol part.
//!
//! The target format is treated as an external sink (§1): coordinates are
//! emitted as raw symbolic-grid units (already ×20 scaled by the reader),
//! matching this sink's plain-number convention.

use std::io::Write;
use std::path::Path;

use crate::altium::error::AltiumError;
use crate::altium::error::AltiumResult;

use super::{SchLib, SchematicPrimitive, Symbol};

fn fmt_point(p: super::Point) -> String {
    format!("{:.2},{:.2}", p.x, p.y)
}

/// Renders one part's primitives to its `.sym` text form.
#[must_use]
pub fn render_part(symbol: &Symbol, part_index: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("SYMBOL {}\n", symbol.name));
    if !symbol.description.is_empty() {
        out.push_str(&format!("DESCRIPTION \"{}\"\n", symbol.description));
    }
    out.push_str(&format!("PART {}\n", part_index + 1));
    for primitive in &symbol.parts[part_index] {
        render_primitive(primitive, &mut out);
    }
    out
}

fn render_primitive(primitive: &SchematicPrimitive, out: &mut String) {
    match primitive {
        SchematicPrimitive::Line { p1, p2, width } => {
            out.push_str(&format!("Line({}, {}, {width:.2})\n", fmt_point(*p1), fmt_point(*p2)));
        }
        SchematicPrimitive::Rectangle { p1, p2 } => {
            out.push_str(&format!("Rectangle({}, {})\n", fmt_point(*p1), fmt_point(*p2)));
        }
        SchematicPrimitive::RoundedRectangle { p1, p2, corner_x_radius, corner_y_radius } => {
            out.push_str(&format!(
                "RoundedRectangle({}, {}, {corner_x_radius:.2}, {corner_y_radius:.2})\n",
                fmt_point(*p1),
                fmt_point(*p2)
            ));
        }
        SchematicPrimitive::Ellipse { center, radius, secondary_radius } => {
            out.push_str(&format!(
                "Ellipse({}, {radius:.2}, {secondary_radius:.2})\n",
                fmt_point(*center)
            ));
        }
        SchematicPrimitive::EllipticalArc { center, radius, secondary_radius, start_deg, end_deg } => {
            out.push_str(&format!(
                "EllipticalArc({}, {radius:.2}, {secondary_radius:.2}, {start_deg:.2}, {end_deg:.2})\n",
                fmt_point(*center)
            ));
        }
        SchematicPrimitive::Arc { center, radius, start_deg, end_deg } => {
            out.push_str(&format!(
                "Arc({}, {radius:.2}, {start_deg:.2}, {end_deg:.2})\n",
                fmt_point(*center)
            ));
        }
        SchematicPrimitive::Polyline { vertices, width } => {
            out.push_str(&format!("Polyline(width={width:.2}, vertices={})\n", vertices.len()));
            for v in vertices {
                out.push_str(&format!("  v {}\n", fmt_point(*v)));
            }
        }
        SchematicPrimitive::Polygon { vertices, is_solid } => {
            out.push_str(&format!("Polygon(solid={is_solid}, vertices={})\n", vertices.len()));
            for v in vertices {
                out.push_str(&format!("  v {}\n", fmt_point(*v)));
            }
        }
        SchematicPrimitive::Bezier { vertices } => {
            out.push_str(&format!("Bezier(vertices={})\n", vertices.len()));
            for v in vertices {
                out.push_str(&format!("  v {}\n", fmt_point(*v)));
            }
        }
        SchematicPrimitive::Text { pos, text } => {
            out.push_str(&format!("Text({}, \"{text}\")\n", fmt_point(*pos)));
        }
        SchematicPrimitive::AttributeText { name, value, is_hidden } => {
            out.push_str(&format!("Attribute(\"{name}\", \"{value}\", hidden={is_hidden})\n"));
        }
        SchematicPrimitive::Pin { p1, p2, label, number, orientation, owner_part } => {
            out.push_str(&format!(
                "Pin({}, {}, \"{label}\", \"{number}\", {orientation:?}, part={owner_part})\n",
                fmt_point(*p1),
                fmt_point(*p2)
            ));
        }
    }
}

/// Writes one `<symbol>-<part>.sym` file per part of `symbol` into
/// `out_dir`.
pub fn write_symbol(symbol: &Symbol, out_dir: &Path) -> AltiumResult<()> {
    for part_index in 0..symbol.parts.len() {
        let path = out_dir.join(format!("{}-{}.sym", symbol.name, part_index + 1));
        let mut file = std::fs::File::create(&path).map_err(|e| AltiumError::file_write(&path, e))?;
        file.write_all(render_part(symbol, part_index).as_bytes())
            .map_err(|e| AltiumError::file_write(&path, e))?;
    }
    Ok(())
}

/// Writes every symbol in `lib` into `out_dir`.
pub fn write_library(lib: &SchLib, out_dir: &Path) -> AltiumResult<()> {
    for symbol in &lib.symbols {
        write_symbol(symbol, out_dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altium::schlib::primitives::{Orientation, Point};

    fn sample_symbol() -> Symbol {
        Symbol {
            name: "RESISTOR".into(),
            description: "Test resistor".into(),
            parts: vec![vec![
                SchematicPrimitive::Rectangle {
                    p1: Point::new(-100.0, -100.0),
                    p2: Point::new(100.0, 100.0),
                },
                SchematicPrimitive::Pin {
                    p1: Point::new(-300.0, 0.0),
                    p2: Point::new(-100.0, 0.0),
                    label: "1".into(),
                    number: "1".into(),
                    orientation: Orientation::Left,
                    owner_part: 0,
                },
            ]],
        }
    }

    #[test]
    fn renders_pin_and_rectangle() {
        let symbol = sample_symbol();
        let rendered = render_part(&symbol, 0);
        assert!(rendered.contains("SYMBOL RESISTOR"));
        assert!(rendered.contains("PART 1"));
        assert!(rendered.contains("Rectangle("));
        assert!(rendered.contains("Pin("));
    }

    #[test]
    fn write_symbol_names_file_per_part() {
        let dir = tempfile::tempdir().unwrap();
        let symbol = sample_symbol();
        write_symbol(&symbol, dir.path()).unwrap();
        assert!(dir.path().join("RESISTOR-1.sym").exists());
    }
}
