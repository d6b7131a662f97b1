use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use crate::config::RowOrder;
use crate::record::{ColorVocabulary, PaintingRecord};

pub const SEQUENCE_COLUMN: &str = "sequence_number";

/// Columns between the leading index column and the indicator columns.
pub const FIELD_COLUMNS: &[&str] = &[
    "painting_index",
    "img_src",
    "painting_title",
    "season",
    "episode",
    "num_colors",
    "youtube_src",
    "colors",
    "color_hex",
];

pub fn header(vocabulary: &ColorVocabulary, order: RowOrder) -> Vec<String> {
    let leading = match order {
        RowOrder::Append => "",
        RowOrder::KeyedBySequenceNumber => SEQUENCE_COLUMN,
    };
    std::iter::once(leading.to_string())
        .chain(FIELD_COLUMNS.iter().map(|c| c.to_string()))
        .chain(vocabulary.names().iter().map(|n| ColorVocabulary::column_name(n)))
        .collect()
}

/// Overwrite `path` with the dataset. Returns the number of data rows.
pub fn write(
    records: &[PaintingRecord],
    vocabulary: &ColorVocabulary,
    order: RowOrder,
    path: &Path,
) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let rows = write_to(records, vocabulary, order, file)?;
    info!("Wrote {} rows to {:?}", rows, path);
    Ok(rows)
}

pub fn write_to<W: Write>(
    records: &[PaintingRecord],
    vocabulary: &ColorVocabulary,
    order: RowOrder,
    writer: W,
) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header(vocabulary, order))?;

    let mut rows: Vec<&PaintingRecord> = records.iter().collect();
    if order == RowOrder::KeyedBySequenceNumber {
        rows.sort_by_key(|r| r.sequence_number());
    }

    for (position, record) in rows.iter().enumerate() {
        let key = match order {
            RowOrder::Append => position as u32,
            RowOrder::KeyedBySequenceNumber => record.sequence_number(),
        };
        out.write_record(row(key, record, vocabulary)?)?;
    }

    out.flush()?;
    Ok(rows.len())
}

fn row(key: u32, record: &PaintingRecord, vocabulary: &ColorVocabulary) -> Result<Vec<String>> {
    let mut cells = vec![
        key.to_string(),
        record.id.to_string(),
        record.image_ref.clone(),
        record.title.clone(),
        record.season.to_string(),
        record.episode.to_string(),
        record.color_count.to_string(),
        record.media_link.clone().unwrap_or_default(),
        serde_json::to_string(&record.colors)?,
        serde_json::to_string(&record.color_hexes)?,
    ];
    for name in vocabulary.names() {
        let present = record
            .color_indicators
            .iter()
            .any(|(known, present)| known == name && *present);
        cells.push(if present { "1" } else { "0" }.to_string());
    }
    Ok(cells)
}

pub fn read(path: &Path, vocabulary: &ColorVocabulary) -> Result<Vec<PaintingRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    read_from(file, vocabulary)
}

/// Parse a dataset produced by [`write_to`] back into records. Indicator
/// columns map back to the vocabulary name they were written from; columns
/// the vocabulary does not know keep their header with `_` read as a space.
pub fn read_from<R: Read>(reader: R, vocabulary: &ColorVocabulary) -> Result<Vec<PaintingRecord>> {
    let mut input = csv::Reader::from_reader(reader);
    let headers = input.headers()?.clone();
    let fixed = 1 + FIELD_COLUMNS.len();
    if headers.len() < fixed || headers.iter().skip(1).take(FIELD_COLUMNS.len()).ne(FIELD_COLUMNS.iter().copied()) {
        bail!("Unexpected dataset header: {:?}", headers);
    }
    let known: Vec<String> = headers
        .iter()
        .skip(fixed)
        .map(|column| {
            vocabulary
                .names()
                .iter()
                .find(|name| ColorVocabulary::column_name(name) == column)
                .cloned()
                .unwrap_or_else(|| column.replace('_', " "))
        })
        .collect();

    let mut records = Vec::new();
    for (line, result) in input.records().enumerate() {
        let cells = result?;
        let cell = |i: usize| cells.get(i).ok_or_else(|| anyhow!("row {}: missing column {}", line, i));
        let number = |i: usize| -> Result<u32> {
            let raw = cell(i)?;
            raw.parse()
                .with_context(|| format!("row {}: bad number {:?} in {}", line, raw, FIELD_COLUMNS[i - 1]))
        };

        let media_link = cell(7)?;
        let mut color_indicators = Vec::with_capacity(known.len());
        for (offset, name) in known.iter().enumerate() {
            let present = match cell(fixed + offset)? {
                "1" => true,
                "0" => false,
                other => bail!("row {}: bad indicator {:?} for {}", line, other, name),
            };
            color_indicators.push((name.clone(), present));
        }

        records.push(PaintingRecord {
            id: number(1)?,
            image_ref: cell(2)?.to_string(),
            title: cell(3)?.to_string(),
            season: number(4)?,
            episode: number(5)?,
            color_count: number(6)?,
            media_link: (!media_link.is_empty()).then(|| media_link.to_string()),
            colors: serde_json::from_str(cell(8)?).with_context(|| format!("row {}: colors", line))?,
            color_hexes: serde_json::from_str(cell(9)?).with_context(|| format!("row {}: color_hex", line))?,
            color_indicators,
        });
    }

    Ok(records)
}
