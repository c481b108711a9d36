//! Rating histogram: votes cast per rating from 1 to 10.

use super::coerce::{parse_histogram_rating, parse_votes};
use super::grid::{CellRole, Grid, TableSchema};
use crate::error::ConvertError;
use crate::models::{HistogramRow, TableKind};
use scraper::ElementRef;

/// One header row and one row per rating bucket.
pub const HISTOGRAM: TableSchema = TableSchema {
    kind: TableKind::Histogram,
    min_rows: 11,
};

const RATING_BUCKETS: usize = 10;

/// Extract the histogram, ordered by ascending rating.
///
/// The page lists buckets from 10 down to 1; every bucket must appear once.
pub fn extract_histogram(table: ElementRef<'_>) -> Result<Vec<HistogramRow>, ConvertError> {
    let grid = Grid::walk(&HISTOGRAM, table)?;

    let mut rows = Vec::with_capacity(RATING_BUCKETS);
    for row in 1..=RATING_BUCKETS {
        let rating = grid.first_text(row, CellRole::RightAligned)?;
        let votes = grid.first_text(row, CellRole::LeftAligned)?;
        rows.push(HistogramRow {
            rating: grid.coerce(row, parse_histogram_rating(&rating))?,
            vote_counts: grid.coerce(row, parse_votes(&votes))?,
        });
    }

    rows.sort_by_key(|r| r.rating);
    if rows.iter().zip(1u8..).any(|(r, expected)| r.rating != expected) {
        return Err(grid.error("rating buckets 1 to 10 must each appear once"));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RatingDocument;

    const FULL: &str = include_str!("../../fixtures/ratings_full.html");

    fn histogram_of(source: &str) -> Result<Vec<HistogramRow>, ConvertError> {
        let doc = RatingDocument::parse(source).unwrap();
        extract_histogram(doc.table(TableKind::Histogram)?)
    }

    #[test]
    fn test_extracts_ten_ascending_buckets() {
        let rows = histogram_of(FULL).unwrap();

        assert_eq!(rows.len(), 10);
        let ratings: Vec<u8> = rows.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, (1..=10).collect::<Vec<u8>>());

        assert_eq!(rows[9], HistogramRow { rating: 10, vote_counts: 12345 });
        assert_eq!(rows[0], HistogramRow { rating: 1, vote_counts: 301 });
        let total: u64 = rows.iter().map(|r| r.vote_counts).sum();
        assert_eq!(total, 29601);
    }

    #[test]
    fn test_too_few_rows() {
        let source = r#"<table cellpadding="0">
            <tr><td>Rating</td></tr>
            <tr><td><div class="rightAligned">10</div></td><td><div class="leftAligned">5</div></td></tr>
        </table>"#;
        let err = histogram_of(source).unwrap_err();
        assert!(err.to_string().contains("expected at least 11 rows, found 2"));
    }

    #[test]
    fn test_unparseable_vote_count() {
        let source = FULL.replacen(
            r#"<div class="leftAligned">8,210</div>"#,
            r#"<div class="leftAligned">many</div>"#,
            1,
        );
        let err = histogram_of(&source).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnexpectedTableShape {
                table: TableKind::Histogram,
                ..
            }
        ));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_duplicate_bucket() {
        let source = FULL.replacen(
            r#"<div class="rightAligned">9</div>"#,
            r#"<div class="rightAligned">10</div>"#,
            1,
        );
        let err = histogram_of(&source).unwrap_err();
        assert!(err.to_string().contains("must each appear once"));
    }
}
