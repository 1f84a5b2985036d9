use std::io::Write;
use std::path::Path;

use super::model::Instrument;

/// Write `rows` as CSV with the sheet's header names.
pub fn write_csv<W: Write>(writer: W, rows: &[&Instrument]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, rows: &[&Instrument]) -> Result<(), csv::Error> {
    write_csv(std::fs::File::create(path)?, rows)?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv;
    use crate::data::model::tests::{inst, table};

    #[test]
    fn export_reads_back_as_snapshot() {
        let t = table(vec![
            inst("Acme Holdings, Inc.", "B2", 9.25, 96.5, 455.0),
            inst("Beta", "Caa1", 13.0, 82.0, 890.5),
        ]);
        let rows: Vec<&Instrument> = t.instruments.iter().rev().collect();
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("Issuer,Industry,Segment,Moodys,YTM,Ask,DM\n"));

        let back = load_csv(buf.as_slice()).unwrap();
        assert_eq!(back.instruments[0].issuer, "Beta");
        assert_eq!(back.instruments[1].issuer, "Acme Holdings, Inc.");
        assert_eq!(back.instruments[1].dm, 455.0);
    }
}
