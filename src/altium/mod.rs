//! Altium Designer file format handling.
//!
//! This module provides read/write capabilities for Altium Designer library files:
//!
//! - `.PcbLib` — PCB footprint libraries
//! - `.SchLib` — Schematic symbol libraries
//!
//! # File Format
//!
//! Altium library files are OLE Compound Documents (CFB format) containing:
//!
//! - A `FileHeader` stream with library metadata
//! - One storage per component, each containing:
//!   - `Data` stream with primitives (pads, tracks, arcs, etc.)
//!   - `Parameters` stream with component properties
//!
//! See `docs/PCBLIB_FORMAT.md` and `docs/SCHLIB_FORMAT.md` for detailed format documentation.
//!
//! # Architecture
//!
//! This module provides the low-level decoders (C1-C6) and library drivers
//! (C8) that turn a raw `.PcbLib`/`.SchLib` file into the geometry types in
//! `pcblib::primitives`/`schlib::primitives`. The text sinks in
//! `pcblib::writer`/`schlib::writer` render that geometry to the external
//! target format (§1), which this crate otherwise treats as out of scope.

pub mod container;
pub mod cursor;
pub mod error;
pub mod model;
pub mod params;
pub mod pcblib;
pub mod placement;
pub mod schlib;
pub mod strings;

pub use error::{AltiumError, AltiumResult};
pub use pcblib::{Footprint, PcbLib};
pub use schlib::{SchLib, Symbol};
