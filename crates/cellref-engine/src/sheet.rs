//! The spreadsheet collaborator.
//!
//! The engine only ever touches the active cell: it reads the reference
//! stored there, writes the re-encoded reference back, and asks for the
//! naming context of a newly created managed file.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Naming context of the active cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellContext {
    /// Name of the active sheet. Becomes the content category.
    pub sheet: String,
    /// Value of the active row's key column.
    pub key: String,
    /// Header of the active column.
    pub field: String,
}

pub trait Sheet: Send + Sync {
    fn read_active(&self) -> EngineResult<String>;

    fn write_active(&self, value: &str) -> EngineResult<()>;

    fn active_context(&self) -> EngineResult<CellContext>;
}

#[derive(Debug)]
struct Grid {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    active: (usize, usize),
}

/// A sheet held in memory.
///
/// Row 0 of `rows` is the first data row below the header. Column 0 is the
/// key column. Cell writes are counted.
#[derive(Debug)]
pub struct InMemorySheet {
    name: String,
    grid: RwLock<Grid>,
    writes: AtomicUsize,
}

impl InMemorySheet {
    pub fn new<I, S>(name: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            grid: RwLock::new(Grid {
                headers: headers.into_iter().map(Into::into).collect(),
                rows: Vec::new(),
                active: (0, 0),
            }),
            writes: AtomicUsize::new(0),
        }
    }

    /// A one-row sheet `[key | field]` with the `field` cell active.
    pub fn single_cell(name: &str, key: &str, field: &str, value: &str) -> Self {
        let sheet = Self::new(name, ["key", field]);
        if let Ok(mut grid) = sheet.grid.write() {
            grid.rows.push(vec![key.to_string(), value.to_string()]);
            grid.active = (0, 1);
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_row<I, S>(&self, values: I) -> EngineResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.write_grid()?
            .rows
            .push(values.into_iter().map(Into::into).collect());
        Ok(())
    }

    pub fn select(&self, row: usize, column: usize) -> EngineResult<()> {
        let mut grid = self.write_grid()?;
        if row >= grid.rows.len() || column >= grid.headers.len() {
            return Err(EngineError::InvalidOperation(format!(
                "cell ({row}, {column}) is outside the sheet"
            )));
        }
        grid.active = (row, column);
        Ok(())
    }

    pub fn cell(&self, row: usize, column: usize) -> EngineResult<String> {
        let grid = self.read_grid()?;
        Ok(grid
            .rows
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default())
    }

    /// Number of `write_active` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read_grid(&self) -> EngineResult<RwLockReadGuard<'_, Grid>> {
        self.grid
            .read()
            .map_err(|e| EngineError::Internal(format!("sheet lock poisoned: {e}")))
    }

    fn write_grid(&self) -> EngineResult<RwLockWriteGuard<'_, Grid>> {
        self.grid
            .write()
            .map_err(|e| EngineError::Internal(format!("sheet lock poisoned: {e}")))
    }
}

impl Sheet for InMemorySheet {
    fn read_active(&self) -> EngineResult<String> {
        let grid = self.read_grid()?;
        let (row, column) = grid.active;
        Ok(grid
            .rows
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default())
    }

    fn write_active(&self, value: &str) -> EngineResult<()> {
        let mut grid = self.write_grid()?;
        let (row, column) = grid.active;
        let width = grid.headers.len().max(column + 1);
        while grid.rows.len() <= row {
            grid.rows.push(Vec::new());
        }
        let cells = &mut grid.rows[row];
        if cells.len() < width {
            cells.resize(width, String::new());
        }
        cells[column] = value.to_string();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn active_context(&self) -> EngineResult<CellContext> {
        let grid = self.read_grid()?;
        let (row, column) = grid.active;
        let key = grid
            .rows
            .get(row)
            .and_then(|r| r.first())
            .cloned()
            .unwrap_or_default();
        let field = grid.headers.get(column).cloned().unwrap_or_default();
        Ok(CellContext {
            sheet: self.name.clone(),
            key,
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_reads_and_writes() {
        let sheet = InMemorySheet::single_cell("posts", "hello", "body", "{}");
        assert_eq!(sheet.read_active().unwrap(), "{}");
        sheet.write_active("[1]").unwrap();
        assert_eq!(sheet.read_active().unwrap(), "[1]");
        assert_eq!(sheet.cell(0, 0).unwrap(), "hello");
        assert_eq!(sheet.write_count(), 1);
    }

    #[test]
    fn context_uses_key_column_and_header() {
        let sheet = InMemorySheet::new("pages", ["slug", "title", "content"]);
        sheet.push_row(["home", "Home", ""]).unwrap();
        sheet.push_row(["about", "About", "<p>hi</p>"]).unwrap();
        sheet.select(1, 2).unwrap();
        assert_eq!(
            sheet.active_context().unwrap(),
            CellContext {
                sheet: "pages".into(),
                key: "about".into(),
                field: "content".into(),
            }
        );
        assert_eq!(sheet.read_active().unwrap(), "<p>hi</p>");
    }

    #[test]
    fn select_outside_sheet_fails() {
        let sheet = InMemorySheet::new("pages", ["slug"]);
        assert!(sheet.select(0, 0).is_err());
    }

    #[test]
    fn short_rows_read_as_empty() {
        let sheet = InMemorySheet::new("pages", ["slug", "content"]);
        sheet.push_row(["home"]).unwrap();
        sheet.select(0, 1).unwrap();
        assert_eq!(sheet.read_active().unwrap(), "");
        sheet.write_active("<p/>").unwrap();
        assert_eq!(sheet.cell(0, 1).unwrap(), "<p/>");
    }
}
