//! Text rendering of a forecast as a tab-separated, color-annotated table.

use std::{iter::FusedIterator, slice};

use tracing::debug;

use crate::{
    config::ResolvedConfig,
    model::{ForecastRow, ForecastTable},
    severity::format_code,
};

/// English plant names, in the order the service lists its German ones.
pub const ENGLISH_PLANTS: [&str; 15] = [
    "Ambrosia", "Dock", "Artemisia", "Birch", "Beech", "Oak", "Alder", "Ash", "Grass", "Hazel",
    "Popplar", "Rye", "Elm", "Plantain", "Willow",
];

/// Column labels are cut to this many characters to keep the table aligned.
pub const LABEL_WIDTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Region,
    Header,
    Rows,
}

/// Lazy iterator over the lines of a rendered forecast.
///
/// Yields the region line, the header and then one line per date.
#[derive(Debug, Clone)]
pub struct Calendar<'a> {
    forecast: &'a ForecastTable,
    config: &'a ResolvedConfig,
    stage: Stage,
    rows: slice::Iter<'a, ForecastRow>,
}

pub fn render<'a>(forecast: &'a ForecastTable, config: &'a ResolvedConfig) -> Calendar<'a> {
    if config.use_english_labels && forecast.pollen.len() != ENGLISH_PLANTS.len() {
        debug!(
            plants = forecast.pollen.len(),
            labels = ENGLISH_PLANTS.len(),
            "English labels don't match the number of plants in the forecast"
        );
    }

    Calendar {
        forecast,
        config,
        stage: Stage::Region,
        rows: forecast.values.iter(),
    }
}

impl Calendar<'_> {
    fn header(&self) -> String {
        let mut line = String::from("Date\t\t");
        if self.config.use_english_labels {
            push_labels(&mut line, ENGLISH_PLANTS.iter().copied());
        } else {
            push_labels(&mut line, self.forecast.pollen.iter().map(String::as_str));
        }
        line
    }

    fn row(&self, row: &ForecastRow) -> String {
        if row.levels.len() != self.forecast.pollen.len() {
            debug!(
                date = %row.date,
                levels = row.levels.len(),
                plants = self.forecast.pollen.len(),
                "row length differs from plant count"
            );
        }

        let mut line = format!("{}\t", row.date);
        for level in &row.levels {
            line.push_str(&format_code(level));
            line.push('\t');
        }
        line
    }
}

impl Iterator for Calendar<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self.stage {
            Stage::Region => {
                self.stage = Stage::Header;
                Some(format!("Data for {}, Germany", self.config.postal_code))
            }
            Stage::Header => {
                self.stage = Stage::Rows;
                Some(self.header())
            }
            Stage::Rows => {
                let row = self.rows.next()?;
                Some(self.row(row))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let fixed = match self.stage {
            Stage::Region => 2,
            Stage::Header => 1,
            Stage::Rows => 0,
        };
        let n = fixed + self.rows.len();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Calendar<'_> {}

impl FusedIterator for Calendar<'_> {}

fn push_labels<'a>(line: &mut String, labels: impl Iterator<Item = &'a str>) {
    for label in labels {
        line.extend(label.chars().take(LABEL_WIDTH));
        line.push('\t');
    }
}
