// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::CompletionResult;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Spaces between columns.
pub const COLUMN_GAP: usize = 2;

/// Writes the candidates of `result` as a column-major table that fits in
/// `terminal_width` columns. Each row ends with `\n`.
///
/// When any type suffix spans several lines, aligning columns is impossible, so every
/// candidate gets a row of its own and its lines are written as they are.
///
/// # Errors
///
/// Errors from `output`.
pub fn list_completions(
    result: &CompletionResult,
    output: &mut dyn Write,
    terminal_width: usize,
) -> io::Result<()> {
    if result.matches.is_empty() {
        return Ok(());
    }

    let cells: Vec<String> = result
        .matches
        .iter()
        .map(|it| format!("{}{}", it.completion, it.type_suffix))
        .collect();

    if cells.iter().any(|cell| cell.contains('\n')) {
        for cell in &cells {
            output.write_all(cell.as_bytes())?;
            if !cell.ends_with('\n') {
                output.write_all(b"\n")?;
            }
        }
        return Ok(());
    }

    let layout = ColumnLayout::new(&cells, terminal_width);
    for row in 0..layout.rows {
        for column in 0..layout.columns {
            let index = column * layout.rows + row;
            let Some(cell) = cells.get(index) else { break };
            output.write_all(cell.as_bytes())?;

            let is_last_in_row = column + 1 == layout.columns
                || (column + 1) * layout.rows + row >= cells.len();
            if !is_last_in_row {
                let padding = layout.column_width - cell.width();
                write!(output, "{:padding$}", "")?;
            }
        }
        output.write_all(b"\n")?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnLayout {
    column_width: usize,
    columns: usize,
    rows: usize,
}

impl ColumnLayout {
    fn new(cells: &[String], terminal_width: usize) -> Self {
        let widest = cells.iter().map(|it| it.width()).max().unwrap_or(0);
        let column_width = widest + COLUMN_GAP;
        // The last column does not need its gap.
        let columns = ((terminal_width + COLUMN_GAP) / column_width).clamp(1, cells.len());
        let rows = cells.len().div_ceil(columns);
        Self {
            column_width,
            columns,
            rows,
        }
    }
}
