//! # Tabular display for extracted features
//!
//! A borrowing renderer to print a [`FeatureTable`] as a **table**: one row per
//! object identifier, one column per requested mean field plus the three
//! per-band peak epochs.
//!
//! The entry point is the display adaptor [`FeatureTableDisplay`]. It borrows
//! the table and renders with Rust formatting (`{}`), without cloning the
//! records. Absent features render as `null`.
//!
//! ```rust,ignore
//! use skystream::alerts::display::FeatureTableDisplayExt;
//!
//! let table = skystream::extract_features(&merged);
//! println!("{}", table.show());
//! ```
use std::fmt;

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

use crate::alerts::features::{FeatureTable, MeanField};
use crate::alerts::FilterBand;

/// Borrowing display adaptor for a [`FeatureTable`].
pub struct FeatureTableDisplay<'a> {
    table: &'a FeatureTable,
    fields: Vec<MeanField>,
    precision: usize,
}

impl<'a> FeatureTableDisplay<'a> {
    pub fn new(table: &'a FeatureTable) -> Self {
        FeatureTableDisplay {
            table,
            fields: MeanField::DEFAULT.to_vec(),
            precision: 6,
        }
    }

    /// Select the mean columns to render (defaults to [`MeanField::DEFAULT`]).
    pub fn with_fields(mut self, fields: &[MeanField]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    /// Fixed-point digits for numeric cells.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }
}

impl fmt::Display for FeatureTableDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec![Cell::new("objectId")];
        header.extend(self.fields.iter().map(|field| Cell::new(field.to_string())));
        header.extend(
            FilterBand::ALL
                .iter()
                .map(|band| Cell::new(format!("peak_mjd_{band}"))),
        );
        table.set_header(header);

        for (object_id, record) in self.table {
            let mut row = vec![Cell::new(object_id)];
            row.extend(
                self.fields
                    .iter()
                    .map(|&field| number_cell(record.mean(field), self.precision)),
            );
            row.extend(
                FilterBand::ALL
                    .iter()
                    .map(|&band| number_cell(record.peak_mjd(band), self.precision)),
            );
            table.add_row(row);
        }

        write!(f, "{table}")
    }
}

fn number_cell(value: Option<f64>, precision: usize) -> Cell {
    let cell = match value {
        Some(value) => Cell::new(format!("{value:.precision$}")),
        None => Cell::new("null"),
    };
    cell.set_alignment(CellAlignment::Right)
}

/// Extension trait to render a [`FeatureTable`] directly.
pub trait FeatureTableDisplayExt {
    /// Display adaptor over this table.
    fn show(&self) -> FeatureTableDisplay<'_>;
}

impl FeatureTableDisplayExt for FeatureTable {
    fn show(&self) -> FeatureTableDisplay<'_> {
        FeatureTableDisplay::new(self)
    }
}
