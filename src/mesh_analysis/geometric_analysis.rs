use log::trace;
use rayon::prelude::*;

use crate::error::GeometryError;
use crate::structs_and_impls::*;

/// Cell centers and inverse-distance weights.
pub struct GeometricAnalysis;

impl GeometricAnalysis {
    /// Computes every cell's center and normalized weights, writes the centers into the
    /// leading coordinate columns of `cells` and returns the weights.
    ///
    /// Cells are independent, so they are processed in parallel; the result does not
    /// depend on scheduling.
    pub fn build_cell_geometry(
        nodal: &Block,                      // coordinate columns come first
        connectivity: &Connectivity,
        coordinate_columns: usize,
        cells: &mut Block,                  // cell_count rows, first `coordinate_columns` columns overwritten
    ) -> Result<Weights, GeometryError> {
        let num_cells = connectivity.num_cells();
        debug_assert_eq!(cells.rows(), num_cells);

        let geometries: Vec<CellGeometry> = (0..num_cells)
            .into_par_iter()
            .map(|cell| Self::cell_geometry(cell, connectivity.cell(cell), nodal, coordinate_columns))
            .collect::<Result<_, _>>()?;

        let mut weights = Vec::with_capacity(num_cells * connectivity.vertices_per_cell());
        for (cell, geometry) in geometries.iter().enumerate() {
            for (c, &value) in geometry.center.iter().enumerate() {
                cells.set(cell, c, value);                                  // center goes to the derived coordinate columns
            }
            weights.extend_from_slice(&geometry.weights);
        }

        trace!("computed geometry for {} cells", num_cells);
        Ok(Weights::new(connectivity.vertices_per_cell(), weights))
    }

    /// Center and normalized inverse-squared-distance weights of one cell.
    pub fn cell_geometry(
        cell: usize,
        vertices: &[usize],
        nodal: &Block,
        coordinate_columns: usize,
    ) -> Result<CellGeometry, GeometryError> {
        if let Some(&index) = vertices.iter().find(|&&v| v >= nodal.rows()) {
            return Err(GeometryError::NodeIndexOutOfRange { cell, index, node_count: nodal.rows() });
        }

        // arithmetic mean of the vertices, each coordinate on its own
        let share = 1.0 / vertices.len() as f64;
        let mut center = vec![0.0; coordinate_columns];
        for &v in vertices {
            for (c, sum) in center.iter_mut().enumerate() {
                *sum += share * nodal.get(v, c);
            }
        }

        let mut weights = Vec::with_capacity(vertices.len());
        for (slot, &v) in vertices.iter().enumerate() {
            let dist_sq: f64 = center
                .iter()
                .enumerate()
                .map(|(c, &x)| {
                    let d = nodal.get(v, c) - x;
                    d * d
                })
                .sum();
            if dist_sq == 0.0 {
                return Err(GeometryError::DegenerateCell { cell, vertex: slot });
            }
            weights.push(1.0 / dist_sq);
        }

        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {                            // underflowed distances give infinite weights
            return Err(GeometryError::NonFiniteWeight { cell });
        }
        for w in weights.iter_mut() {
            *w /= total;
        }

        Ok(CellGeometry { center, weights })
    }
}
