//! Table fixtures.
//!
//! A small internships table, shaped like the spreadsheet a placement
//! office would keep: an id column, a few text columns, and the usual
//! untidiness (padding whitespace, short rows, blank lines, notes rows).

use tabsync_model::{RawRow, Row, Snapshot};

/// Builds a row from string slices.
pub fn row(cells: &[&str]) -> Row {
    cells.iter().copied().collect()
}

/// Header of the internships table.
pub fn internship_header() -> Row {
    row(&["ID", "Company Name", "Job Title", "CGPA Cut-off", "Remarks"])
}

/// Clean internship records.
pub fn internship_rows() -> Vec<Row> {
    vec![
        row(&["1", "Acme", "Backend Intern", "7.5", ""]),
        row(&["2", "Globex", "Data Intern", "8.0", "remote"]),
        row(&["3", "Initech", "QA Intern", "6.5", ""]),
    ]
}

/// The same table as a spreadsheet would return it.
///
/// Normalizes to [`internship_snapshot`].
pub fn internship_raw() -> Vec<RawRow> {
    let cell = |s: &str| Some(s.to_string());
    vec![
        internship_header().to_raw(),
        vec![cell(" 1 "), cell("Acme"), cell("Backend Intern "), cell("7.5")],
        vec![],
        vec![cell("2"), cell("Globex"), cell("Data Intern"), cell("8.0"), cell(" remote")],
        vec![cell(""), cell(""), None, cell("   ")],
        vec![cell("3"), cell("Initech"), cell("QA Intern"), cell("6.5"), None],
    ]
}

/// Normalized internships table.
pub fn internship_snapshot() -> Snapshot {
    Snapshot::from_rows(internship_header(), internship_rows())
}
