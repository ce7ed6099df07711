use std::fs;
use std::path::Path;

use log::debug;
use vtkio::model::*; // import model definition of a VTK file

use crate::error::WriterError;
use crate::structs_and_impls::*;

/// Writes a frame as a VTK XML unstructured grid (.vtu).
pub struct VtuWriter;

impl VtuWriter {
    pub fn write_vtu<P: AsRef<Path>>(frame: &Frame, output_path: P) -> Result<(), WriterError> {
        let mut vtu = Vec::new();
        Self::build_vtk(frame)?
            .write_xml(&mut vtu)
            .map_err(|e| WriterError::Vtk(format!("{:?}", e)))?;

        fs::write(output_path.as_ref(), &vtu)?;
        debug!("wrote {}", output_path.as_ref().display());
        Ok(())
    }

    /// Quad mesh in the coordinate plane with nodal variables as point data and the
    /// interpolated variables as cell data.
    pub fn build_vtk(frame: &Frame) -> Result<Vtk, WriterError> {
        let coordinate_columns = frame.layout.coordinate_columns;
        if coordinate_columns == 0 || coordinate_columns > 3 {
            return Err(WriterError::ShapeMismatch(format!(
                "cannot place {} coordinate columns in 3D points",
                coordinate_columns
            )));
        }

        // 1. Points: padded with zeros up to three components
        let mut points_data = Vec::with_capacity(frame.num_nodes() * 3);
        for node in 0..frame.num_nodes() {
            for c in 0..3 {
                points_data.push(if c < coordinate_columns { frame.nodal.get(node, c) } else { 0.0 });
            }
        }

        // 2. Connectivity and offsets
        let vertices = frame.connectivity.vertices_per_cell() as u64;
        let connectivity: Vec<u64> = frame.connectivity.indices().iter().map(|&i| i as u64).collect();
        let offsets: Vec<u64> = (1..=frame.num_cells() as u64).map(|cell| cell * vertices).collect();
        let cell_types = vec![frame.layout.topology.eltype_vtk(); frame.num_cells()];

        // 3. Attributes
        let point_attributes = Self::scalar_attributes(&frame.nodal_names, &frame.nodal)?;
        let cell_attributes = Self::scalar_attributes(&frame.interpolated_names, &frame.interpolated)?;

        Ok(Vtk {
            version: Version { major: 1, minor: 0 },
            title: frame.title.clone(),
            byte_order: ByteOrder::LittleEndian,
            file_path: None,
            data: DataSet::inline(UnstructuredGridPiece {
                points: IOBuffer::F64(points_data),
                cells: Cells {
                    cell_verts: VertexNumbers::XML { connectivity, offsets },
                    types: cell_types,
                },
                data: Attributes {
                    point: point_attributes,
                    cell: cell_attributes,
                },
            }),
        })
    }

    fn scalar_attributes(names: &[String], block: &Block) -> Result<Vec<Attribute>, WriterError> {
        if names.len() != block.columns() {
            return Err(WriterError::ShapeMismatch(format!(
                "{} names for {} columns",
                names.len(),
                block.columns()
            )));
        }
        Ok(names
            .iter()
            .enumerate()
            .map(|(j, name)| Attribute::scalars(name.as_str(), 1).with_data(IOBuffer::F64(block.column(j).to_vec())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tecplot::{TecplotParser, TextCursor};

    const FRAME: &str = "TITLE = \"two cells\"\nVARIABLES = \"z\"\n\"r\"\n\"phi\"\n\"ne\"\n\
ZONE N=6, E=2, VARLOCATION=([4-4]=CELLCENTERED)\n\
0\n1\n2\n0\n1\n2\n\
0\n0\n0\n1\n1\n1\n\
1\n2\n3\n4\n5\n6\n\
10\n20\n\
1 2 5 4\n2 3 6 5\n";

    #[test]
    fn test_vtk_model_shape() {
        let (frame, _) = TecplotParser::parse_frame(TextCursor::new(FRAME), &FrameLayout::default()).unwrap();
        let vtk = VtuWriter::build_vtk(&frame).unwrap();
        match vtk.data {
            DataSet::UnstructuredGrid { pieces, .. } => {
                let Piece::Inline(piece) = &pieces[0] else { panic!("expected inline piece") };
                assert_eq!(piece.points.len(), 18);
                assert_eq!(piece.cells.types, vec![CellType::Quad, CellType::Quad]);
                assert_eq!(piece.data.point.len(), 3);
                assert_eq!(piece.data.cell.len(), 4);
            }
            _ => panic!("expected an unstructured grid"),
        }
    }

    #[test]
    fn test_write_vtu_file() {
        let (frame, _) = TecplotParser::parse_frame(TextCursor::new(FRAME), &FrameLayout::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output_0000.vtu");
        VtuWriter::write_vtu(&frame, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("UnstructuredGrid"));
        assert!(text.contains("phi"));
    }
}
