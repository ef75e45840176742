//! altium-libdecode: decodes proprietary Altium Designer library files into
//! open geometry descriptions.
//!
//! This crate reads `.PcbLib` (PCB footprint) and `.SchLib` (schematic
//! symbol) files — OLE Compound Document containers holding Altium's binary
//! record formats — and turns them into plain geometry types that a text
//! sink renders to an external target format.
//!
//! # Modules
//!
//! - [`altium`] — the OLE-backed decoders and library drivers for both file
//!   kinds, plus the geometry types and text sinks they produce.
//! - [`config`] — configuration loading and validation.
//! - [`error`] — top-level configuration error types.

pub mod altium;
pub mod config;
pub mod error;
