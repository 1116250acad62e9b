//! Import of profiles from delimited text tables.
//!
//! The first non-empty line holds the column headings. Fields are separated
//! by commas, or by tabs when the heading line contains no comma.

use log::debug;

use crate::error::{Error, Result};
use crate::profile::{Profile, ProfileEntry, Source};
use crate::raster::Calibration;

const KNOWN_UNITS: [&str; 5] = ["\u{00B5}", "micron", "mm", "cm", "pixels"];

fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter)
        .map(|f| f.trim().trim_matches('"'))
        .collect()
}

fn column_index(headings: &[&str], wanted: &str) -> Result<usize> {
    headings
        .iter()
        .position(|h| *h == wanted)
        .ok_or_else(|| Error::Parse {
            line: 1,
            message: format!(
                "heading '{wanted}' not found among [{}]",
                headings.join(", ")
            ),
        })
}

/// Unit label found in a column heading such as `"Radius (µm)"`.
#[must_use]
pub fn guess_unit(heading: &str) -> Option<&'static str> {
    let lower = heading.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .find_map(|token| KNOWN_UNITS.iter().find(|u| token.contains(*u)).copied())
}

/// Builds a profile from tabular text.
///
/// `rows` is an optional inclusive range of 0-based data rows (the heading
/// line is not counted); `None` reads every row.
///
/// # Errors
/// Returns [`Error::Parse`] for missing headings, short rows and values that
/// are not numbers, [`Error::InvalidParameter`] for an out-of-range row
/// selection, [`Error::InsufficientData`] if there are no data rows, and
/// [`Error::DuplicateRadius`] for repeated radii.
pub fn parse_csv(
    text: &str,
    radii_header: &str,
    counts_header: &str,
    rows: Option<(usize, usize)>,
) -> Result<Profile> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((_, heading_line)) = lines.next() else {
        return Err(Error::insufficient("table does not contain valid data"));
    };
    let delimiter = if heading_line.contains(',') { ',' } else { '\t' };
    let headings = split_fields(heading_line, delimiter);
    let radii_col = column_index(&headings, radii_header)?;
    let counts_col = column_index(&headings, counts_header)?;

    let data: Vec<(usize, &str)> = lines.collect();
    if data.is_empty() {
        return Err(Error::insufficient("table does not contain valid data"));
    }
    let last_row = data.len() - 1;
    let (start_row, end_row) = rows.unwrap_or((0, last_row));
    if start_row > end_row || end_row > last_row {
        return Err(Error::invalid(format!(
            "rows {start_row}..={end_row} are out of range (0..={last_row})"
        )));
    }

    let mut profile = Profile::new();
    for &(idx, line) in &data[start_row..=end_row] {
        let fields = split_fields(line, delimiter);
        let value = |col: usize| -> Result<f64> {
            let raw = fields.get(col).ok_or_else(|| Error::Parse {
                line: idx + 1,
                message: format!("expected at least {} fields", col + 1),
            })?;
            raw.parse::<f64>().map_err(|e| Error::Parse {
                line: idx + 1,
                message: format!("'{raw}': {e}"),
            })
        };
        profile.add_entry(ProfileEntry::new(value(radii_col)?, value(counts_col)?))?;
    }

    debug!(
        "parsed {} table rows ({radii_header} vs {counts_header})",
        profile.len()
    );
    let props = profile.properties_mut();
    props.source = Source::Table;
    if let Some(unit) = guess_unit(radii_header) {
        props.calibration = Some(Calibration::default().with_unit(unit));
    }
    Ok(profile)
}
