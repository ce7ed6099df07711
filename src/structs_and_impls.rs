use vtkio::model::CellType;

/// Vertex count of the only supported cell shape.
pub const QUAD_VERTICES: usize = 4;

/// Leading nodal variables that hold the spatial coordinates (z and r in the usual exports).
pub const DEFAULT_COORDINATE_COLUMNS: usize = 2;

/// Cell shapes understood by the connectivity reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTopology {
    Quad,                                   // Four-node quadrilateral (FEQUADRILATERAL zones)
}

impl CellTopology {
    pub fn vertex_count(&self) -> usize {
        match self {
            CellTopology::Quad => QUAD_VERTICES,
        }
    }

    pub fn eltype_vtk(&self) -> CellType {   // converts the cell topology to its VTK cell type
        match self {
            CellTopology::Quad => CellType::Quad,
        }
    }
}

/// What to do with a data token that is not a decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    #[default]
    Strict,                                 // Fail the frame with ParseError::NumericParse
    ZeroFill,                               // Store 0.0 and count the substitution
}

/// Conventions of the tool that produced the export, made explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub coordinate_columns: usize,          // Leading nodal variables used as coordinates
    pub topology: CellTopology,             // Shape of every cell in the zone
    pub numeric_policy: NumericPolicy,      // Handling of malformed numeric tokens
}

impl Default for FrameLayout {
    fn default() -> Self {
        FrameLayout {
            coordinate_columns: DEFAULT_COORDINATE_COLUMNS,
            topology: CellTopology::Quad,
            numeric_policy: NumericPolicy::Strict,
        }
    }
}

impl FrameLayout {
    pub fn with_coordinate_columns(mut self, coordinate_columns: usize) -> Self {
        self.coordinate_columns = coordinate_columns;
        self
    }

    pub fn with_numeric_policy(mut self, numeric_policy: NumericPolicy) -> Self {
        self.numeric_policy = numeric_policy;
        self
    }

    pub fn vertices_per_cell(&self) -> usize {
        self.topology.vertex_count()
    }
}

/// Where a variable's values live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRole {
    Nodal,                                  // Defined at mesh vertices
    CellNative,                             // Defined at cell centers in the file
    Derived,                                // Coordinates, recomputed at cell centers
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub role: VariableRole,
}

/// Node/cell counts and the cell-centered variable range from a ZONE line.
///
/// Both indices are 0-based and inclusive. An empty cell range is encoded as
/// `last_cell_var_index + 1 == first_cell_var_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneMeta {
    pub node_count: usize,
    pub cell_count: usize,
    pub first_cell_var_index: usize,
    pub last_cell_var_index: usize,
}

impl ZoneMeta {
    pub fn num_node_vars(&self) -> usize {
        self.first_cell_var_index
    }

    /// Cell-centered variables actually present in the file.
    pub fn num_cell_native_vars(&self) -> usize {
        (self.last_cell_var_index + 1).saturating_sub(self.first_cell_var_index)
    }

    /// Columns of the cell block: derived coordinates followed by the native cell variables.
    pub fn num_cell_vars(&self, coordinate_columns: usize) -> usize {
        self.num_cell_native_vars() + coordinate_columns
    }

    pub fn num_interp_vars(&self, coordinate_columns: usize) -> usize {
        self.num_node_vars() + self.num_cell_vars(coordinate_columns) - coordinate_columns
    }

    /// Lines of data the header promises after the ZONE line: one per nodal value, one per
    /// native cell value and one connectivity line per cell. `None` if the count overflows.
    pub fn data_line_count(&self) -> Option<usize> {
        let nodal = self.node_count.checked_mul(self.num_node_vars())?;
        let cells = self.cell_count.checked_mul(self.num_cell_native_vars())?;
        nodal.checked_add(cells)?.checked_add(self.cell_count)
    }
}

/// Column-major array of `rows x columns` values, one column per variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl Block {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Block { rows, columns, values: vec![0.0; rows * columns] }
    }

    /// Wraps values already laid out column by column.
    pub fn from_column_major(rows: usize, columns: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * columns);
        Block { rows, columns, values }
    }

    /// New block with `count` zero columns in front of the existing ones.
    pub fn with_leading_zero_columns(self, count: usize) -> Self {
        let mut values = vec![0.0; self.rows * count];
        values.extend_from_slice(&self.values);
        Block { rows: self.rows, columns: self.columns + count, values }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn column(&self, column: usize) -> &[f64] {
        &self.values[column * self.rows..(column + 1) * self.rows]
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[column * self.rows + row]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.values[column * self.rows + row] = value;
    }

    /// Indices of columns whose values are all exactly zero.
    pub fn zero_columns(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&j| self.rows > 0 && self.column(j).iter().all(|&v| v == 0.0))
            .collect()
    }
}

/// Per-cell vertex lists, stored row-major with a fixed vertex count per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Connectivity {
    vertices_per_cell: usize,
    indices: Vec<usize>,                    // 0-based node indices
}

impl Connectivity {
    pub fn new(vertices_per_cell: usize, indices: Vec<usize>) -> Self {
        debug_assert!(vertices_per_cell > 0 && indices.len() % vertices_per_cell == 0);
        Connectivity { vertices_per_cell, indices }
    }

    pub fn vertices_per_cell(&self) -> usize {
        self.vertices_per_cell
    }

    pub fn num_cells(&self) -> usize {
        self.indices.len() / self.vertices_per_cell
    }

    pub fn cell(&self, cell: usize) -> &[usize] {
        &self.indices[cell * self.vertices_per_cell..(cell + 1) * self.vertices_per_cell]
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Normalized inverse-distance weights, one per connectivity slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    vertices_per_cell: usize,
    values: Vec<f64>,
}

impl Weights {
    pub fn new(vertices_per_cell: usize, values: Vec<f64>) -> Self {
        debug_assert!(vertices_per_cell > 0 && values.len() % vertices_per_cell == 0);
        Weights { vertices_per_cell, values }
    }

    pub fn num_cells(&self) -> usize {
        self.values.len() / self.vertices_per_cell
    }

    pub fn cell(&self, cell: usize) -> &[f64] {
        &self.values[cell * self.vertices_per_cell..(cell + 1) * self.vertices_per_cell]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Center and weights of a single cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellGeometry {
    pub center: Vec<f64>,                   // One value per coordinate column
    pub weights: Vec<f64>,                  // One value per vertex, summing to 1
}

/// One fully decoded and interpolated snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub title: String,
    pub variables: Vec<Variable>,           // Declared variables with their roles
    pub zone: ZoneMeta,
    pub layout: FrameLayout,
    pub nodal_names: Vec<String>,           // Columns of `nodal`
    pub cell_names: Vec<String>,            // Columns of `cells`: coordinates then native cell variables
    pub interpolated_names: Vec<String>,    // Columns of `interpolated`
    pub nodal: Block,                       // node_count x num_node_vars
    pub cells: Block,                       // cell_count x num_cell_vars
    pub connectivity: Connectivity,
    pub weights: Weights,
    pub interpolated: Block,                // cell_count x num_interp_vars
    pub substituted_values: usize,          // Tokens replaced by 0.0 under NumericPolicy::ZeroFill
}

impl Frame {
    pub fn num_nodes(&self) -> usize {
        self.zone.node_count
    }

    pub fn num_cells(&self) -> usize {
        self.zone.cell_count
    }

    /// Interpolated columns that carry no information.
    pub fn zero_interpolated_columns(&self) -> Vec<usize> {
        self.interpolated.zero_columns()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} nodes, {} cells, {} nodal / {} cell-centered variables -> {} interpolated columns",
            self.zone.node_count,
            self.zone.cell_count,
            self.zone.num_node_vars(),
            self.zone.num_cell_native_vars(),
            self.interpolated.columns(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_meta_column_counts() {
        let zone = ZoneMeta { node_count: 4, cell_count: 1, first_cell_var_index: 3, last_cell_var_index: 5 };
        assert_eq!(zone.num_node_vars(), 3);
        assert_eq!(zone.num_cell_native_vars(), 3);
        assert_eq!(zone.num_cell_vars(2), 5);
        assert_eq!(zone.num_interp_vars(2), 6);
    }

    #[test]
    fn test_zone_meta_empty_cell_range() {
        let zone = ZoneMeta { node_count: 4, cell_count: 1, first_cell_var_index: 3, last_cell_var_index: 2 };
        assert_eq!(zone.num_cell_native_vars(), 0);
        assert_eq!(zone.num_cell_vars(2), 2);
        assert_eq!(zone.num_interp_vars(2), 3);
    }

    #[test]
    fn test_zone_meta_data_line_count() {
        let zone = ZoneMeta { node_count: 9, cell_count: 4, first_cell_var_index: 3, last_cell_var_index: 4 };
        assert_eq!(zone.data_line_count(), Some(27 + 8 + 4));

        let huge_cells = ZoneMeta { cell_count: usize::MAX, ..zone };
        assert_eq!(huge_cells.data_line_count(), None);
        let huge_nodes = ZoneMeta { node_count: usize::MAX / 2, ..zone };
        assert_eq!(huge_nodes.data_line_count(), None);
    }

    #[test]
    fn test_leading_zero_columns() {
        let native = Block::from_column_major(2, 1, vec![3.0, 4.0]);
        let cells = native.with_leading_zero_columns(2);
        assert_eq!(cells.columns(), 3);
        assert_eq!(cells.values(), &[0.0, 0.0, 0.0, 0.0, 3.0, 4.0]);

        let bare = Block::from_column_major(5, 0, Vec::new()).with_leading_zero_columns(0);
        assert_eq!(bare.rows(), 5);
        assert!(bare.values().is_empty());
    }

    #[test]
    fn test_block_is_column_major() {
        let mut block = Block::zeros(3, 2);
        block.set(0, 1, 7.0);
        block.set(2, 0, 1.5);
        assert_eq!(block.values(), &[0.0, 0.0, 1.5, 7.0, 0.0, 0.0]);
        assert_eq!(block.column(1), &[7.0, 0.0, 0.0]);
        assert_eq!(block.get(2, 0), 1.5);
        assert_eq!(block.zero_columns(), Vec::<usize>::new());

        let empty = Block::zeros(2, 3);
        assert_eq!(empty.zero_columns(), vec![0, 1, 2]);
    }

    #[test]
    fn test_layout_builders() {
        let layout = FrameLayout::default()
            .with_coordinate_columns(3)
            .with_numeric_policy(NumericPolicy::ZeroFill);
        assert_eq!(layout.coordinate_columns, 3);
        assert_eq!(layout.numeric_policy, NumericPolicy::ZeroFill);
        assert_eq!(layout.vertices_per_cell(), QUAD_VERTICES);
        assert_eq!(FrameLayout::default().numeric_policy, NumericPolicy::Strict);
    }

    #[test]
    fn test_connectivity_rows() {
        let conn = Connectivity::new(QUAD_VERTICES, vec![0, 1, 2, 3, 1, 4, 5, 2]);
        assert_eq!(conn.num_cells(), 2);
        assert_eq!(conn.cell(1), &[1, 4, 5, 2]);
    }
}
