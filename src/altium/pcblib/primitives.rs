//! Footprint primitive types emitted by the PcbLib record decoder (C5).

use crate::altium::placement::Placement;

/// A point in the internal integer coordinate system: signed 1/10000 inch.
pub type Coord = i32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    #[must_use]
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Renders as `%.2fmil`, where mil = raw/10000.
    #[must_use]
    pub fn mil(&self) -> (f64, f64) {
        (f64::from(self.x) / 10_000.0, f64::from(self.y) / 10_000.0)
    }
}

/// One element of a decoded footprint.
#[derive(Debug, Clone, PartialEq)]
pub enum FootprintPrimitive {
    Arc {
        center: Point,
        radius: Coord,
        start_deg: f64,
        sweep_deg: f64,
        thickness: Coord,
        layer: u8,
    },
    Line {
        p1: Point,
        p2: Point,
        width: Coord,
        layer: u8,
    },
    /// Emitted as six element-lines (four sides + two diagonals) in the
    /// target format; the canonical format has no rectangle primitive.
    Rectangle { p1: Point, p2: Point, layer: u8 },
    /// May be suppressed by the sink; the canonical format has no
    /// text-in-element support.
    Text {
        pos: Point,
        height: Coord,
        angle: f64,
        text: String,
        font: Option<String>,
    },
    PinThrough {
        center: Point,
        pad_diameter: Coord,
        clearance: Coord,
        mask: Coord,
        drill: Coord,
        is_hole: bool,
        is_square: bool,
        name: String,
    },
    PadSmd {
        p1: Point,
        p2: Point,
        thickness: Coord,
        clearance: Coord,
        mask: Coord,
        is_square: bool,
        name: String,
    },
    Polygon {
        layer: u8,
        attributes: String,
        vertex_list: Vec<(f64, f64)>,
    },
    ModelPlacement {
        filename: String,
        placement: Placement,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_mil_conversion() {
        let p = Point::new(12_345, -6_789);
        let (x, y) = p.mil();
        assert!((x - 1.2345).abs() < 1e-9);
        assert!((y - -0.6789).abs() < 1e-9);
    }
}
