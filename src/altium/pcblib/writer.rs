//! Text sink for decoded footprints: writes one `<footprint>.fp` element
//! list per footprint.
//!
//! The target format is treated as an external sink (§1): this writer
//! renders each `FootprintPrimitive` as one line, with every coordinate
//! rendered `%.2fmil` (mil = raw/10000), matching §6's numeric format.

use std::io::Write;
use std::path::Path;

use crate::altium::error::AltiumError;
use crate::altium::error::AltiumResult;
use crate::altium::placement::Placement;

use super::{Footprint, FootprintPrimitive, Point};

fn mil(raw: i32) -> f64 {
    f64::from(raw) / 10_000.0
}

fn fmt_point(p: Point) -> String {
    let (x, y) = p.mil();
    format!("{x:.2}mil,{y:.2}mil")
}

fn fmt_vec3(v: crate::altium::placement::Vec3) -> String {
    format!("{:.2}mil,{:.2}mil,{:.2}mil", v.x, v.y, v.z)
}

/// Renders one footprint's primitives to its `.fp` text form.
#[must_use]
pub fn render_footprint(footprint: &Footprint) -> String {
    let mut out = String::new();
    out.push_str(&format!("FOOTPRINT {}\n", footprint.name));
    for primitive in &footprint.primitives {
        render_primitive(primitive, &mut out);
    }
    out
}

fn render_primitive(primitive: &FootprintPrimitive, out: &mut String) {
    match primitive {
        FootprintPrimitive::Arc { center, radius, start_deg, sweep_deg, thickness, layer } => {
            out.push_str(&format!(
                "ElementArc({}, {:.2}mil, {:.2}, {:.2}, {:.2}mil, layer={layer})\n",
                fmt_point(*center),
                mil(*radius),
                start_deg,
                sweep_deg,
                mil(*thickness)
            ));
        }
        FootprintPrimitive::Line { p1, p2, width, layer } => {
            out.push_str(&format!(
                "ElementLine({}, {}, {:.2}mil, layer={layer})\n",
                fmt_point(*p1),
                fmt_point(*p2),
                mil(*width)
            ));
        }
        FootprintPrimitive::Rectangle { p1, p2, layer } => {
            out.push_str(&format!(
                "ElementRectangle({}, {}, layer={layer})\n",
                fmt_point(*p1),
                fmt_point(*p2)
            ));
        }
        FootprintPrimitive::Text { pos, height, angle, text, font } => {
            out.push_str(&format!(
                "ElementText({}, {:.2}mil, {:.2}, \"{}\", font={})\n",
                fmt_point(*pos),
                mil(*height),
                angle,
                text,
                font.as_deref().unwrap_or("default")
            ));
        }
        FootprintPrimitive::PinThrough {
            center,
            pad_diameter,
            clearance,
            mask,
            drill,
            is_hole,
            is_square,
            name,
        } => {
            out.push_str(&format!(
                "Pin({}, {:.2}mil, {:.2}mil, {:.2}mil, {:.2}mil, hole={is_hole}, square={is_square}, name=\"{name}\")\n",
                fmt_point(*center),
                mil(*pad_diameter),
                mil(*clearance),
                mil(*mask),
                mil(*drill),
            ));
        }
        FootprintPrimitive::PadSmd { p1, p2, thickness, clearance, mask, is_square, name } => {
            out.push_str(&format!(
                "Pad({}, {}, {:.2}mil, {:.2}mil, {:.2}mil, square={is_square}, name=\"{name}\")\n",
                fmt_point(*p1),
                fmt_point(*p2),
                mil(*thickness),
                mil(*clearance),
                mil(*mask),
            ));
        }
        FootprintPrimitive::Polygon { layer, attributes, vertex_list } => {
            out.push_str(&format!(
                "Polygon(layer={layer}, attrs=\"{attributes}\", vertices={})\n",
                vertex_list.len()
            ));
            for (x, y) in vertex_list {
                out.push_str(&format!("  v {x:.2}mil, {y:.2}mil\n"));
            }
        }
        FootprintPrimitive::ModelPlacement { filename, placement } => {
            render_model_placement(filename, *placement, out);
        }
    }
}

fn render_model_placement(filename: &str, placement: Placement, out: &mut String) {
    let cwd = std::env::current_dir().unwrap_or_default();
    out.push_str("PCB::3d_model::type = \"STEP-AP214\"\n");
    out.push_str(&format!(
        "filename = \"{}/{filename}\"\n",
        cwd.display()
    ));
    out.push_str(&format!("origin = {}\n", fmt_vec3(placement.origin)));
    out.push_str(&format!("axis = {}\n", fmt_vec3(placement.axis)));
    out.push_str(&format!("ref_dir = {}\n", fmt_vec3(placement.ref_dir)));
    out.push_str(&format!("origin.x = {:.2}mil\n", placement.origin.x));
    out.push_str(&format!("origin.y = {:.2}mil\n", placement.origin.y));
    out.push_str(&format!("origin.z = {:.2}mil\n", placement.origin.z));
    out.push_str(&format!("axis.x = {:.2}mil\n", placement.axis.x));
    out.push_str(&format!("axis.y = {:.2}mil\n", placement.axis.y));
    out.push_str(&format!("axis.z = {:.2}mil\n", placement.axis.z));
    out.push_str(&format!("ref_dir.x = {:.2}mil\n", placement.ref_dir.x));
    out.push_str(&format!("ref_dir.y = {:.2}mil\n", placement.ref_dir.y));
    out.push_str(&format!("ref_dir.z = {:.2}mil\n", placement.ref_dir.z));
}

/// Writes `<footprint>.fp` into `out_dir`.
pub fn write_footprint(footprint: &Footprint, out_dir: &Path) -> AltiumResult<()> {
    let path = out_dir.join(format!("{}.fp", footprint.name));
    let mut file = std::fs::File::create(&path).map_err(|e| AltiumError::file_write(&path, e))?;
    file.write_all(render_footprint(footprint).as_bytes())
        .map_err(|e| AltiumError::file_write(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altium::pcblib::primitives::Point;

    #[test]
    fn renders_arc_and_pad() {
        let footprint = Footprint {
            name: "R0805".into(),
            primitives: vec![
                FootprintPrimitive::Arc {
                    center: Point::new(0, 0),
                    radius: 4096,
                    start_deg: 180.0,
                    sweep_deg: 180.0,
                    thickness: 10,
                    layer: 33,
                },
                FootprintPrimitive::PadSmd {
                    p1: Point::new(-1000, -500),
                    p2: Point::new(1000, 500),
                    thickness: 2000,
                    clearance: 100,
                    mask: 100,
                    is_square: true,
                    name: "1".into(),
                },
            ],
        };
        let rendered = render_footprint(&footprint);
        assert!(rendered.contains("FOOTPRINT R0805"));
        assert!(rendered.contains("ElementArc"));
        assert!(rendered.contains("Pad("));
        assert!(rendered.contains("0.41mil") || rendered.contains("mil"));
    }
}
