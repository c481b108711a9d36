//! Ratings by voter region.

use super::coerce::{parse_linked_votes, parse_rating};
use super::grid::{text_of, CellRole, Grid, TableSchema};
use crate::error::ConvertError;
use crate::models::{Region, RegionRow, TableKind};
use scraper::ElementRef;

/// Region header row plus one data row.
pub const REGION: TableSchema = TableSchema {
    kind: TableKind::Region,
    min_rows: 2,
};

/// Extract one row per region column, in column order.
pub fn extract_region(table: ElementRef<'_>) -> Result<Vec<RegionRow>, ConvertError> {
    let grid = Grid::walk(&REGION, table)?;

    let mut regions: Vec<Region> = Vec::new();
    for cell in grid.cells(0, CellRole::Label) {
        let label = text_of(cell);
        let region = Region::from_label(&label)
            .ok_or_else(|| grid.row_error(0, format!("unknown region {:?}", label)))?;
        if regions.contains(&region) {
            return Err(grid.row_error(0, format!("region {:?} repeated", label)));
        }
        regions.push(region);
    }

    let ratings = grid.cells_exactly(1, CellRole::BigCell, regions.len())?;
    let votes = grid.cells_exactly(1, CellRole::Any, regions.len())?;

    regions
        .into_iter()
        .zip(ratings)
        .zip(votes)
        .map(|((region, rating), votes)| -> Result<RegionRow, ConvertError> {
            let link = Grid::link_text(votes);
            Ok(RegionRow {
                region,
                rating: grid.coerce(1, parse_rating(&text_of(rating)))?,
                vote_counts: grid.coerce(1, parse_linked_votes(link.as_deref()))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RatingDocument;

    const FULL: &str = include_str!("../../fixtures/ratings_full.html");

    fn region_of(source: &str) -> Result<Vec<RegionRow>, ConvertError> {
        let doc = RatingDocument::parse(source).unwrap();
        extract_region(doc.table(TableKind::Region)?)
    }

    #[test]
    fn test_extracts_one_row_per_region() {
        let rows = region_of(FULL).unwrap();
        assert_eq!(
            rows,
            vec![
                RegionRow {
                    region: Region::Top1000Voters,
                    rating: Some(8.1),
                    vote_counts: 512,
                },
                RegionRow {
                    region: Region::UsUsers,
                    rating: Some(8.8),
                    vote_counts: 6004,
                },
                RegionRow {
                    region: Region::NonUsUsers,
                    rating: Some(8.6),
                    vote_counts: 15230,
                },
            ]
        );
    }

    #[test]
    fn test_region_without_votes() {
        let source = FULL
            .replacen(r#"<div class="bigcell">8.1</div>"#, r#"<div class="bigcell">-</div>"#, 1)
            .replacen(
                r#"<div class="smallcell"><a href="/title/tt0000001/ratings?demo=region">512</a></div>"#,
                r#"<div class="smallcell">-</div>"#,
                1,
            );
        let rows = region_of(&source).unwrap();
        assert_eq!(rows[0].rating, None);
        assert_eq!(rows[0].vote_counts, 0);
        assert_eq!(rows[1].vote_counts, 6004);
    }

    #[test]
    fn test_fewer_regions_on_page() {
        let source = r##"<table cellpadding="0"><tr><td></td></tr></table>
            <table><tr><td></td></tr></table>
            <table>
              <tr><th><div>US Users</div></th><th><div>Non-US Users</div></th></tr>
              <tr>
                <td align="center"><div class="bigcell">7.0</div><div class="smallcell"><a href="#">1,000</a></div></td>
                <td align="center"><div class="bigcell">7.4</div><div class="smallcell"><a href="#">2,000</a></div></td>
              </tr>
            </table>"##;
        let rows = region_of(source).unwrap();
        let regions: Vec<Region> = rows.iter().map(|r| r.region).collect();
        assert_eq!(regions, vec![Region::UsUsers, Region::NonUsUsers]);
    }

    #[test]
    fn test_missing_vote_cell() {
        let source = r##"<table cellpadding="0"><tr><td></td></tr></table>
            <table><tr><td></td></tr></table>
            <table>
              <tr><th><div>US Users</div></th><th><div>Non-US Users</div></th></tr>
              <tr><td align="center"><div class="bigcell">7.0</div><div class="bigcell">7.4</div></td></tr>
            </table>"##;
        let err = region_of(source).unwrap_err();
        assert!(err.to_string().contains("expected 2 table cells, found 1"));
    }
}
