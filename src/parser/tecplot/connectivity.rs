use log::trace;

use super::cursor::TextCursor;
use crate::error::{GeometryError, ParseError};
use crate::structs_and_impls::*;

pub struct ConnectivityReader;

impl ConnectivityReader {
    /// Reads `cell_count` lines of 1-based node indices and converts them to 0-based.
    pub fn read<'a>(
        cursor: TextCursor<'a>,
        zone: &ZoneMeta,
        layout: &FrameLayout,
    ) -> Result<(Connectivity, TextCursor<'a>), ParseError> {
        let vertices = layout.vertices_per_cell();
        let mut indices = Vec::new();                                      // Grows with the lines actually read
        let mut rest = cursor;

        for cell in 0..zone.cell_count {
            if rest.is_empty() {
                return Err(ParseError::UnexpectedEnd { context: "cell connectivity", offset: rest.offset() });
            }
            let (line, next) = rest.next_line();
            let before = indices.len();

            let mut tokens = line.trim();
            loop {
                let (token, remaining) = tokens.next_token(b" \t");       // Indices are whitespace separated
                if token.is_empty() {
                    break;
                }
                indices.push(Self::parse_index(token, cell, zone.node_count)?);
                tokens = remaining;
            }

            let found = indices.len() - before;
            if found != vertices {                                         // Quad zones carry exactly four indices per cell
                return Err(GeometryError::TopologyMismatch { expected: vertices, found }.into());
            }
            rest = next;
        }

        trace!("read connectivity for {} cells", zone.cell_count);
        Ok((Connectivity::new(vertices, indices), rest))
    }

    // One 1-based index -> 0-based, checked against the node count.
    fn parse_index(token: TextCursor<'_>, cell: usize, node_count: usize) -> Result<usize, ParseError> {
        let one_based = token.as_str().parse::<usize>().map_err(|e| {
            ParseError::Connectivity(format!(
                "cell {}: `{}` at byte offset {} is not a node index ({})",
                cell,
                token.as_str(),
                token.offset(),
                e
            ))
        })?;
        let index = one_based.checked_sub(1).ok_or_else(|| {
            ParseError::Connectivity(format!("cell {}: node indices are 1-based, found 0", cell))
        })?;
        if index >= node_count {
            return Err(GeometryError::NodeIndexOutOfRange { cell, index, node_count }.into());
        }
        Ok(index)
    }
}
