// src/lib.rs

pub mod error;
pub mod structs_and_impls;
pub mod parser;
pub mod writer;
pub mod mesh_analysis;

pub use error::{GeometryError, ParseError, WriterError};
pub use mesh_analysis::geometric_analysis::GeometricAnalysis;
pub use mesh_analysis::interpolation::Interpolator;
pub use parser::tecplot::{FrameReader, TecplotParser, TextCursor};
pub use structs_and_impls::*;
pub use writer::table_writer::TableWriter;
pub use writer::xml_writer::VtuWriter;
