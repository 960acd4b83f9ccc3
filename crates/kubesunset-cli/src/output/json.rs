use std::io::Write;

use super::FindingRecord;
use crate::error::Result;

/// Pretty-printed JSON array, one object per finding
pub fn write<W: Write>(records: &[FindingRecord], mut w: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, records)?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
