use std::fs;
use std::path::Path;

use log::{debug, info, trace, warn};

use super::arrays::ArrayReader;
use super::connectivity::ConnectivityReader;
use super::cursor::TextCursor;
use super::zone_header::{FrameHeader, ZoneHeaderParser};
use crate::error::ParseError;
use crate::mesh_analysis::geometric_analysis::GeometricAnalysis;
use crate::mesh_analysis::interpolation::Interpolator;
use crate::structs_and_impls::*;

/// Progress through one frame, in the order the text is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Start,
    HeaderParsed,
    NodalRead,
    CellRead,
    ConnectivityAndGeometryDone,
    Interpolated,
    Emitted,
}

pub struct TecplotParser;

impl TecplotParser {
    /// Parses one frame starting at `cursor` and returns it with the cursor moved past
    /// its last connectivity line (and any blank lines after it). An empty returned
    /// cursor means the input is exhausted.
    pub fn parse_frame<'a>(
        cursor: TextCursor<'a>,
        layout: &FrameLayout,
    ) -> Result<(Frame, TextCursor<'a>), ParseError> {
        let mut stage = FrameStage::Start;
        let mut advance = |next: FrameStage, at: &TextCursor<'_>| {
            trace!("{:?} -> {:?} at byte {}", stage, next, at.offset());
            stage = next;
        };

        let (header, rest) = ZoneHeaderParser::parse(cursor, layout)?;
        advance(FrameStage::HeaderParsed, &rest);
        let zone = header.zone;

        let mut substituted_values = 0;
        let (nodal, rest) = ArrayReader::read_nodal(rest, &zone, layout.numeric_policy, &mut substituted_values)?;
        advance(FrameStage::NodalRead, &rest);
        let (native_cells, rest) =
            ArrayReader::read_cells(rest, &zone, layout.numeric_policy, &mut substituted_values)?;
        advance(FrameStage::CellRead, &rest);
        if substituted_values > 0 {
            warn!("{} non-numeric data tokens were replaced by 0.0", substituted_values);
        }

        let (connectivity, rest) = ConnectivityReader::read(rest, &zone, layout)?;
        let mut cells = native_cells.with_leading_zero_columns(layout.coordinate_columns);
        let weights = GeometricAnalysis::build_cell_geometry(&nodal, &connectivity, layout.coordinate_columns, &mut cells)?;
        advance(FrameStage::ConnectivityAndGeometryDone, &rest);

        let interpolated =
            Interpolator::interpolate(&zone, &nodal, &cells, &connectivity, &weights, layout.coordinate_columns);
        advance(FrameStage::Interpolated, &rest);

        let (nodal_names, cell_names) = Self::name_projections(&header, layout.coordinate_columns);
        let interpolated_names =
            Interpolator::interpolated_names(&nodal_names, &cell_names, layout.coordinate_columns);

        let FrameHeader { title, variables, .. } = header;
        let frame = Frame {
            title,
            variables,
            zone,
            layout: layout.clone(),
            nodal_names,
            cell_names,
            interpolated_names,
            nodal,
            cells,
            connectivity,
            weights,
            interpolated,
            substituted_values,
        };
        let rest = rest.skip_blank_lines();
        advance(FrameStage::Emitted, &rest);
        debug!("frame: {}", frame.summary());

        Ok((frame, rest))
    }

    // Nodal names are the declared nodal variables; cell names are the coordinate
    // names (recomputed at centers) followed by the native cell variables.
    fn name_projections(header: &FrameHeader, coordinate_columns: usize) -> (Vec<String>, Vec<String>) {
        let nodal_names: Vec<String> = header
            .variables
            .iter()
            .filter(|v| v.role != VariableRole::CellNative)
            .map(|v| v.name.clone())
            .collect();
        let cell_names = nodal_names
            .iter()
            .take(coordinate_columns)
            .cloned()
            .chain(
                header
                    .variables
                    .iter()
                    .filter(|v| v.role == VariableRole::CellNative)
                    .map(|v| v.name.clone()),
            )
            .collect();
        (nodal_names, cell_names)
    }

    /// Reads the whole file and parses every frame. A frame that fails is reported in
    /// its slot and the frames after it are still parsed; only reading the file is fatal.
    pub fn parse_file<P: AsRef<Path>>(
        path: P,
        layout: &FrameLayout,
    ) -> Result<Vec<Result<Frame, ParseError>>, ParseError> {
        let text = fs::read_to_string(path.as_ref())?;
        let frames: Vec<_> = FrameReader::new(&text, layout.clone()).collect();
        let failed = frames.iter().filter(|f| f.is_err()).count();
        info!(
            "parsed {} frames from {} ({} failed)",
            frames.len(),
            path.as_ref().display(),
            failed
        );
        Ok(frames)
    }
}

/// Iterates over the frames of an in-memory export.
///
/// After a frame fails to parse, the reader skips to the next line starting with
/// `TITLE` and carries on from there, so one bad frame costs only itself.
pub struct FrameReader<'a> {
    rest: TextCursor<'a>,
    layout: FrameLayout,
    frames_read: usize,
}

impl<'a> FrameReader<'a> {
    pub fn new(text: &'a str, layout: FrameLayout) -> Self {
        FrameReader { rest: TextCursor::new(text), layout, frames_read: 0 }
    }

    /// Unconsumed input.
    pub fn remaining(&self) -> TextCursor<'a> {
        self.rest
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    // Moves past the current line, then to the next line that opens a frame.
    fn resynchronize(cursor: TextCursor<'a>) -> TextCursor<'a> {
        let (_, mut rest) = cursor.next_line();
        while !rest.is_empty() && !rest.trim_start().starts_with("TITLE") {
            rest = rest.next_line().1;
        }
        rest
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<Frame, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.rest.skip_blank_lines();
        if start.is_empty() {
            self.rest = start;
            return None;
        }
        self.frames_read += 1;
        match TecplotParser::parse_frame(start, &self.layout) {
            Ok((frame, rest)) => {
                self.rest = rest;
                Some(Ok(frame))
            }
            Err(e) => {
                self.rest = Self::resynchronize(start);
                warn!(
                    "frame {} at byte {} failed: {}; resuming at byte {}",
                    self.frames_read - 1,
                    start.offset(),
                    e,
                    self.rest.offset()
                );
                Some(Err(e))
            }
        }
    }
}
