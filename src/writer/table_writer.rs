use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::WriterError;
use crate::structs_and_impls::*;

/// Writes each frame's interpolated cell data as a tab-separated text table.
#[derive(Debug, Clone)]
pub struct TableWriter {
    output_dir: PathBuf,
    source: String,                                   // Input path recorded in the header
    annotations: Vec<(String, String)>,               // key = value lines recorded in the header
    skip_zero_columns: bool,                          // Drop columns that are zero in every cell
}

impl TableWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P, source: impl Into<String>) -> Self {
        TableWriter {
            output_dir: output_dir.into(),
            source: source.into(),
            annotations: Vec::new(),
            skip_zero_columns: false,
        }
    }

    pub fn with_annotations(mut self, annotations: Vec<(String, String)>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_skip_zero_columns(mut self, skip: bool) -> Self {
        self.skip_zero_columns = skip;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<output_dir>/output_<index:04>.txt`
    pub fn output_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("output_{:04}.txt", index))
    }

    /// Writes one frame, creating the output directory if needed.
    pub fn write_frame(&self, index: usize, frame: &Frame) -> Result<PathBuf, WriterError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(index);
        let mut out = BufWriter::new(File::create(&path)?);
        let generated = chrono::Local::now().to_rfc3339();
        self.write_table(&mut out, frame, &generated)?;
        out.flush()?;
        debug!("wrote {}", path.display());
        Ok(path)
    }

    /// Renders the header block, the name row and one row per cell.
    pub fn write_table<W: Write>(&self, out: &mut W, frame: &Frame, generated: &str) -> Result<(), WriterError> {
        let table = &frame.interpolated;
        if frame.interpolated_names.len() != table.columns() {
            return Err(WriterError::ShapeMismatch(format!(
                "{} names for {} interpolated columns",
                frame.interpolated_names.len(),
                table.columns()
            )));
        }

        let skipped = if self.skip_zero_columns { frame.zero_interpolated_columns() } else { Vec::new() };
        let columns: Vec<usize> = (0..table.columns()).filter(|j| !skipped.contains(j)).collect();

        writeln!(out, "# source: {}", self.source)?;
        writeln!(out, "# generated: {}", generated)?;
        for (key, value) in &self.annotations {
            writeln!(out, "# {} = {}", key, value)?;
        }
        if !skipped.is_empty() {
            let names: Vec<&str> = skipped.iter().map(|&j| frame.interpolated_names[j].as_str()).collect();
            writeln!(out, "# all-zero columns omitted: {}", names.join(", "))?;
        }

        let header: Vec<&str> = columns.iter().map(|&j| frame.interpolated_names[j].as_str()).collect();
        writeln!(out, "{}", header.join("\t"))?;

        for cell in 0..table.rows() {
            let row: Vec<String> = columns.iter().map(|&j| format!("{:.12e}", table.get(cell, j))).collect();
            writeln!(out, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}
