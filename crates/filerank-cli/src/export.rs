use anyhow::Result;
use filerank_core::ranking::{ranked_entries, RankedEntry};
use filerank_core::{RankingRecord, RankingStatus};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    ranking: &'a RankingRecord,
    complete: bool,
    ranked: Vec<RankedEntry>,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    path: &'a str,
}

pub fn write_json<W: Write>(record: &RankingRecord, out: W) -> Result<()> {
    let document = ExportDocument {
        ranking: record,
        complete: record.status == RankingStatus::Complete,
        ranked: ranked_entries(record),
    };
    serde_json::to_writer_pretty(out, &document)?;
    Ok(())
}

pub fn write_csv<W: Write>(record: &RankingRecord, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for entry in ranked_entries(record) {
        writer.serialize(CsvRow {
            rank: entry.rank,
            path: &entry.file.path,
        })?;
    }
    writer.flush()?;
    Ok(())
}
