//! Elastic column alignment in the manner of gofmt's tabwriter.
//!
//! A row is a list of cells; every cell except the last is terminated and takes
//! part in alignment. A column block is a run of consecutive rows that all have
//! a terminated cell in that column. Blocks nest: column `n + 1` is aligned only
//! within the rows of the enclosing column `n` block. Cells are padded with
//! spaces to the block width plus one; a block of empty cells takes no space.

const PADDING: usize = 1;

/// Aligns rows of cells and returns one rendered string per row.
pub fn align(rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    assign_widths(rows, 0..rows.len(), 0, &mut widths);

    rows.iter()
        .zip(&widths)
        .map(|(cells, widths)| render_row(cells, widths))
        .collect()
}

fn terminated(cells: &[String]) -> usize {
    cells.len().saturating_sub(1)
}

fn width_of(cell: &str) -> usize {
    cell.chars().count()
}

fn assign_widths(
    rows: &[Vec<String>],
    range: std::ops::Range<usize>,
    column: usize,
    widths: &mut [Vec<usize>],
) {
    let mut line = range.start;
    while line < range.end {
        if column >= terminated(&rows[line]) {
            line += 1;
            continue;
        }

        let block_start = line;
        let mut width = 0;
        let mut discardable = true;
        while line < range.end && column < terminated(&rows[line]) {
            let cell = width_of(&rows[line][column]);
            width = width.max(cell + PADDING);
            if cell > 0 {
                discardable = false;
            }
            line += 1;
        }
        if discardable {
            width = 0;
        }

        for row in &mut widths[block_start..line] {
            row.push(width);
        }
        assign_widths(rows, block_start..line, column + 1, widths);
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    let last = terminated(cells);
    for (cell, width) in cells[..last].iter().zip(widths) {
        out.push_str(cell);
        let pad = width.saturating_sub(width_of(cell));
        out.extend(std::iter::repeat(' ').take(pad));
    }
    if let Some(cell) = cells.get(last) {
        out.push_str(cell);
    }
    out.truncate(out.trim_end().len());
    out
}
