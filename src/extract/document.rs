//! A parsed ratings page and its three tables.

use crate::error::ConvertError;
use crate::models::TableKind;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("static selector is valid"));

/// Attribute that the ratings table carries on real ratings pages.
pub const MARKER_ATTRIBUTE: &str = "cellpadding";

/// Why a snapshot holds no ratings data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page has no `<table>` at all.
    NoTable,
    /// The first table lacks the marker attribute.
    MissingMarker,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoTable => write!(f, "page contains no table"),
            SkipReason::MissingMarker => {
                write!(f, "first table has no '{}' attribute", MARKER_ATTRIBUTE)
            }
        }
    }
}

/// A snapshot page that passed the marker check.
pub struct RatingDocument {
    html: Html,
}

impl RatingDocument {
    /// Parse `source` and check that it looks like a ratings page.
    pub fn parse(source: &str) -> Result<Self, SkipReason> {
        let html = Html::parse_document(source);

        let marked = {
            let first = html.select(&TABLE).next().ok_or(SkipReason::NoTable)?;
            first.value().attr(MARKER_ATTRIBUTE).is_some()
        };
        if !marked {
            return Err(SkipReason::MissingMarker);
        }

        Ok(Self { html })
    }

    pub fn table_count(&self) -> usize {
        self.html.select(&TABLE).count()
    }

    /// The `<table>` element holding `kind`.
    pub fn table(&self, kind: TableKind) -> Result<ElementRef<'_>, ConvertError> {
        self.html
            .select(&TABLE)
            .nth(kind.position())
            .ok_or_else(|| {
                ConvertError::shape(
                    kind,
                    format!(
                        "page has {} tables, expected one at position {}",
                        self.table_count(),
                        kind.position()
                    ),
                )
            })
    }
}
