//! Human-readable grid dump of the knowledge map
//!
//! Diagnostic only: one two-character symbol per cell over the bounding box
//! of known cells, row-major, one line per row.

use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::grid::Coords;
use crate::knowledge::map::KnowledgeMap;

/// Render the known region as text
pub fn render_grid(map: &KnowledgeMap) -> String {
    let Some((min_row, max_row, min_col, max_col)) = bounds(map) else {
        return String::new();
    };

    let mut out = String::new();
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            let symbol = map
                .tile(Coords::new(row, col))
                .map_or("  ", |tile| tile.symbol());
            out.push_str(symbol);
        }
        out.push('\n');
    }
    out
}

/// Write the rendered grid to a file
pub fn dump_to_file(map: &KnowledgeMap, path: &Path) -> Result<()> {
    fs::write(path, render_grid(map))?;
    Ok(())
}

fn bounds(map: &KnowledgeMap) -> Option<(i32, i32, i32, i32)> {
    let mut cells = map.iter().map(|(c, _)| *c);
    let first = cells.next()?;
    Some(cells.fold(
        (first.row, first.row, first.col, first.col),
        |(min_r, max_r, min_c, max_c), c| {
            (min_r.min(c.row), max_r.max(c.row), min_c.min(c.col), max_c.max(c.col))
        },
    ))
}
