//! Generic walker over the rows and cells of a rating table.
//!
//! Each extractor declares a [`TableSchema`] and reads cells by row index
//! and [`CellRole`]. Every layout violation comes back as
//! [`ConvertError::UnexpectedTableShape`] naming the table and row.

use crate::error::ConvertError;
use crate::models::TableKind;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static RIGHT_ALIGNED: Lazy<Selector> = Lazy::new(|| selector("div.rightAligned"));
static LEFT_ALIGNED: Lazy<Selector> = Lazy::new(|| selector("div.leftAligned"));
static BIG_CELL: Lazy<Selector> = Lazy::new(|| selector("div.bigcell"));
static CENTER_ALIGNED: Lazy<Selector> = Lazy::new(|| selector(r#"td[align="center"]"#));
static LABEL: Lazy<Selector> = Lazy::new(|| selector("div"));
static ANY_CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

/// Role of a cell within a row, as marked up on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    /// `div.rightAligned`: histogram rating bucket.
    RightAligned,
    /// `div.leftAligned`: histogram vote count, demographic row label.
    LeftAligned,
    /// `div.bigcell`: rating of a demographic or region bucket.
    BigCell,
    /// `td[align=center]`: demographic bucket holding the vote link.
    CenterAligned,
    /// Any `div` of a header row.
    Label,
    /// Any `td`.
    Any,
}

impl CellRole {
    fn selector(self) -> &'static Selector {
        match self {
            CellRole::RightAligned => &*RIGHT_ALIGNED,
            CellRole::LeftAligned => &*LEFT_ALIGNED,
            CellRole::BigCell => &*BIG_CELL,
            CellRole::CenterAligned => &*CENTER_ALIGNED,
            CellRole::Label => &*LABEL,
            CellRole::Any => &*ANY_CELL,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            CellRole::RightAligned => "right-aligned",
            CellRole::LeftAligned => "left-aligned",
            CellRole::BigCell => "big",
            CellRole::CenterAligned => "center-aligned",
            CellRole::Label => "label",
            CellRole::Any => "table",
        }
    }
}

/// Expected layout of a table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub kind: TableKind,
    /// Header row plus data rows. Extra trailing rows are ignored.
    pub min_rows: usize,
}

/// Trimmed text content of an element.
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Rows of one table, addressed by index.
pub struct Grid<'a> {
    kind: TableKind,
    rows: Vec<ElementRef<'a>>,
}

impl<'a> Grid<'a> {
    /// Collect the rows of `table`, checking the schema's row count.
    pub fn walk(schema: &TableSchema, table: ElementRef<'a>) -> Result<Self, ConvertError> {
        let rows: Vec<ElementRef<'a>> = table.select(&ROW).collect();
        if rows.len() < schema.min_rows {
            return Err(ConvertError::shape(
                schema.kind,
                format!(
                    "expected at least {} rows, found {}",
                    schema.min_rows,
                    rows.len()
                ),
            ));
        }
        Ok(Self {
            kind: schema.kind,
            rows,
        })
    }

    /// All cells of `role` in `row`, in document order.
    pub fn cells(&self, row: usize, role: CellRole) -> Vec<ElementRef<'a>> {
        match self.rows.get(row) {
            Some(element) => element.select(role.selector()).collect(),
            None => Vec::new(),
        }
    }

    /// Cells of `role` in `row`; there must be exactly `expected` of them.
    pub fn cells_exactly(
        &self,
        row: usize,
        role: CellRole,
        expected: usize,
    ) -> Result<Vec<ElementRef<'a>>, ConvertError> {
        let cells = self.cells(row, role);
        if cells.len() != expected {
            return Err(self.row_error(
                row,
                format!(
                    "expected {} {} cells, found {}",
                    expected,
                    role.describe(),
                    cells.len()
                ),
            ));
        }
        Ok(cells)
    }

    /// The first `count` cells of `role` in `row`; fewer is an error.
    pub fn cells_at_least(
        &self,
        row: usize,
        role: CellRole,
        count: usize,
    ) -> Result<Vec<ElementRef<'a>>, ConvertError> {
        let mut cells = self.cells(row, role);
        if cells.len() < count {
            return Err(self.row_error(
                row,
                format!(
                    "expected {} {} cells, found {}",
                    count,
                    role.describe(),
                    cells.len()
                ),
            ));
        }
        cells.truncate(count);
        Ok(cells)
    }

    /// Text of the first cell of `role` in `row`.
    pub fn first_text(&self, row: usize, role: CellRole) -> Result<String, ConvertError> {
        self.cells(row, role)
            .into_iter()
            .next()
            .map(text_of)
            .ok_or_else(|| self.row_error(row, format!("missing {} cell", role.describe())))
    }

    /// Text of the link nested in `cell`, if there is one.
    pub fn link_text(cell: ElementRef<'_>) -> Option<String> {
        cell.select(&LINK).next().map(text_of)
    }

    /// Attach row context to a coercion result.
    pub fn coerce<T>(&self, row: usize, value: Result<T, String>) -> Result<T, ConvertError> {
        value.map_err(|reason| self.row_error(row, reason))
    }

    pub fn row_error(&self, row: usize, reason: impl std::fmt::Display) -> ConvertError {
        ConvertError::shape(self.kind, format!("row {}: {}", row, reason))
    }

    pub fn error(&self, reason: impl Into<String>) -> ConvertError {
        ConvertError::shape(self.kind, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const SCHEMA: TableSchema = TableSchema {
        kind: TableKind::Region,
        min_rows: 2,
    };

    fn first_table(html: &Html) -> ElementRef<'_> {
        html.select(&selector("table")).next().unwrap()
    }

    #[test]
    fn test_walk_checks_row_count() {
        let html = Html::parse_document("<table><tr><td>only</td></tr></table>");
        let err = Grid::walk(&SCHEMA, first_table(&html)).err().unwrap();
        assert!(err.to_string().contains("expected at least 2 rows, found 1"));
    }

    #[test]
    fn test_cells_by_role() {
        let html = Html::parse_document(
            r#"<table>
                <tr><th><div>a</div></th><th><div>b</div></th></tr>
                <tr>
                  <td align="center"><div class="bigcell">7.1</div><a href="/x">1,200</a></td>
                  <td align="center"><div class="bigcell">-</div></td>
                </tr>
              </table>"#,
        );
        let grid = Grid::walk(&SCHEMA, first_table(&html)).unwrap();
        assert_eq!(grid.rows.len(), 2);

        let labels: Vec<String> = grid.cells(0, CellRole::Label).into_iter().map(text_of).collect();
        assert_eq!(labels, vec!["a", "b"]);

        let votes = grid.cells_exactly(1, CellRole::CenterAligned, 2).unwrap();
        assert_eq!(Grid::link_text(votes[0]).as_deref(), Some("1,200"));
        assert_eq!(Grid::link_text(votes[1]), None);

        assert_eq!(grid.first_text(1, CellRole::BigCell).unwrap(), "7.1");
        assert!(grid.cells_exactly(1, CellRole::BigCell, 3).is_err());
        assert_eq!(grid.cells_at_least(1, CellRole::BigCell, 1).unwrap().len(), 1);
        assert!(grid.first_text(1, CellRole::RightAligned).is_err());
        assert!(grid.cells(9, CellRole::Any).is_empty());
    }

    #[test]
    fn test_coerce_attaches_row() {
        let html = Html::parse_document("<table><tr><td></td></tr><tr><td></td></tr></table>");
        let grid = Grid::walk(&SCHEMA, first_table(&html)).unwrap();
        let err = grid.coerce::<u64>(1, Err("bad".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "region table has an unexpected shape: row 1: bad");
    }
}
