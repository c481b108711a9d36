//! Ratings by gender and age group.

use super::coerce::{parse_linked_votes, parse_rating};
use super::grid::{text_of, CellRole, Grid, TableSchema};
use crate::error::ConvertError;
use crate::models::{AgeGroup, DemographicRow, Gender, TableKind};
use scraper::ElementRef;

/// Age-group header row plus the All, Males and Females rows.
pub const DEMOGRAPHIC: TableSchema = TableSchema {
    kind: TableKind::Demographic,
    min_rows: 4,
};

const GENDER_ROWS: usize = 3;
const AGE_GROUPS: usize = 5;

/// Extract the 3 x 5 demographic grid, gender-major.
pub fn extract_demographic(table: ElementRef<'_>) -> Result<Vec<DemographicRow>, ConvertError> {
    let grid = Grid::walk(&DEMOGRAPHIC, table)?;

    let mut age_groups: Vec<AgeGroup> = Vec::with_capacity(AGE_GROUPS);
    for cell in grid.cells_exactly(0, CellRole::Label, AGE_GROUPS)? {
        let label = text_of(cell);
        let age_group = AgeGroup::from_label(&label)
            .ok_or_else(|| grid.row_error(0, format!("unknown age group {:?}", label)))?;
        if age_groups.contains(&age_group) {
            return Err(grid.row_error(0, format!("age group {:?} repeated", label)));
        }
        age_groups.push(age_group);
    }

    let mut genders: Vec<Gender> = Vec::with_capacity(GENDER_ROWS);
    let mut rows = Vec::with_capacity(GENDER_ROWS * AGE_GROUPS);

    for row in 1..=GENDER_ROWS {
        let label = grid.first_text(row, CellRole::LeftAligned)?;
        let gender = Gender::from_label(&label)
            .ok_or_else(|| grid.row_error(row, format!("unknown gender {:?}", label)))?;
        if genders.contains(&gender) {
            return Err(grid.row_error(row, format!("gender {:?} repeated", label)));
        }
        genders.push(gender);

        let ratings = grid.cells_at_least(row, CellRole::BigCell, AGE_GROUPS)?;
        let votes = grid.cells_at_least(row, CellRole::CenterAligned, AGE_GROUPS)?;

        for ((age_group, rating), votes) in age_groups.iter().zip(ratings).zip(votes) {
            let link = Grid::link_text(votes);
            rows.push(DemographicRow {
                gender,
                age_group: *age_group,
                rating: grid.coerce(row, parse_rating(&text_of(rating)))?,
                vote_count: grid.coerce(row, parse_linked_votes(link.as_deref()))?,
            });
        }
    }

    Ok(rows)
}
