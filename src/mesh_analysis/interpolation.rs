use rayon::prelude::*;

use crate::structs_and_impls::*;

/// Transfers nodal fields to cell centers and appends the native cell fields.
pub struct Interpolator;

impl Interpolator {
    /// Builds the combined `cell_count x (num_node_vars + num_cell_vars - coordinate_columns)`
    /// block, ordered as [nodal variables][native cell variables].
    ///
    /// Coordinate columns come straight from the cell centers in `cells`; other nodal
    /// variables are weighted sums over each cell's vertices.
    pub fn interpolate(
        zone: &ZoneMeta,
        nodal: &Block,
        cells: &Block,
        connectivity: &Connectivity,
        weights: &Weights,
        coordinate_columns: usize,
    ) -> Block {
        let num_cells = zone.cell_count;
        let num_node_vars = zone.num_node_vars();
        debug_assert_eq!(cells.rows(), num_cells);
        debug_assert_eq!(cells.columns(), zone.num_cell_vars(coordinate_columns));
        let mut out = Block::zeros(num_cells, zone.num_interp_vars(coordinate_columns));
        if num_cells == 0 {
            return out;
        }

        out.values_mut()
            .par_chunks_mut(num_cells)                                      // one chunk per output column
            .enumerate()
            .for_each(|(var, column)| {
                if var < coordinate_columns {
                    column.copy_from_slice(cells.column(var));
                } else if var < num_node_vars {
                    let values = nodal.column(var);
                    for (cell, slot) in column.iter_mut().enumerate() {
                        *slot = connectivity
                            .cell(cell)
                            .iter()
                            .zip(weights.cell(cell))
                            .map(|(&node, &w)| w * values[node])
                            .sum();
                    }
                } else {
                    let native = coordinate_columns + (var - num_node_vars);
                    column.copy_from_slice(cells.column(native));
                }
            });

        out
    }

    /// Names of the interpolated columns: all nodal names, then the native cell names
    /// (the coordinate entries of `cell_names` are already covered by the nodal ones).
    pub fn interpolated_names(
        nodal_names: &[String],
        cell_names: &[String],
        coordinate_columns: usize,
    ) -> Vec<String> {
        nodal_names
            .iter()
            .chain(cell_names.iter().skip(coordinate_columns))
            .cloned()
            .collect()
    }
}
