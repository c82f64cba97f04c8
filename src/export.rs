use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::LoadError;
use crate::schedule::SeatingPlan;

/// One occupied seat as written to CSV.
#[derive(Debug, Serialize)]
struct SeatRow<'a> {
    hall: &'a str,
    row: usize,
    column: usize,
    seat: usize,
    class_name: &'a str,
    roll_no: i64,
    late_entry: bool,
}

/// Writes every occupied seat of `plan`, hall by hall in row-major order.
///
/// Rows, columns and seats are 1-based in the output. Returns the number of
/// rows written.
pub fn write_seating_csv<W: Write>(plan: &SeatingPlan, writer: W) -> Result<usize, LoadError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut written = 0;

    for hall in &plan.halls {
        for (pos, candidate) in hall.seating.candidates() {
            wtr.serialize(SeatRow {
                hall: &hall.hall_name,
                row: pos.row + 1,
                column: pos.col + 1,
                seat: pos.seat + 1,
                class_name: &candidate.class_name,
                roll_no: candidate.roll_no,
                late_entry: candidate.is_late_entry,
            })?;
            written += 1;
        }
    }

    wtr.flush()?;
    Ok(written)
}

/// Exports a seating plan to a CSV file, replacing any existing file.
pub fn export_seating_to_csv(plan: &SeatingPlan, csv_path: &Path) -> Result<usize, LoadError> {
    let file = File::create(csv_path)?;
    write_seating_csv(plan, file)
}
