//! Pipeline tests for the processor module
//!
//! Run the complete analysis against small storm datasets written to
//! temporary directories.

pub mod basic_pipeline;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "STATE__,BGN_DATE,EVTYPE,FATALITIES,INJURIES,PROPDMG,PROPDMGEXP,CROPDMG,CROPDMGEXP,REMARKS,REFNUM";

/// Three events: two tornadoes and one flood
pub const SCENARIO_ROWS: &[&str] = &[
    "1.00,\"4/18/1950 0:00:00\",TORNADO,5.00,10.00,2.50,K,0.00,,,1.00",
    "1.00,\"4/18/1950 0:00:00\",TORNADO,3.00,0.00,1.00,M,0.00,,\"touchdown, then lift\",2.00",
    "1.00,\"5/01/1993 0:00:00\",FLOOD,0.00,2.00,0.00,,4.00,B,,3.00",
];

pub fn csv_text(rows: &[&str]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

/// Write rows as a bzip2-compressed dataset, the way the public file is shipped
pub fn write_bz2_dataset(dir: &Path, rows: &[&str]) -> PathBuf {
    use bzip2::Compression;
    use bzip2::write::BzEncoder;

    let path = dir.join("StormData.csv.bz2");
    let mut encoder = BzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(csv_text(rows).as_bytes()).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();
    path
}

pub fn write_plain_dataset(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("StormData.csv");
    fs::write(&path, csv_text(rows)).unwrap();
    path
}
