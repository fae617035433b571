//! CSV and BibTeX export of the ranked record set.
//!
//! The table file is UTF-8 with a byte-order marker so spreadsheet software
//! picks up the encoding. The bibliography uses generic `@misc` entries whose
//! shape depends on the record's source channel.

use crate::error::Result;
use crate::record::{PaperRecord, Source};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// UTF-8 byte-order marker for spreadsheet compatibility
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write one CSV row per record, header row included.
pub fn write_csv(path: &Path, records: &[PaperRecord]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut wtr = csv::Writer::from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = records.len(), "Wrote CSV table");
    Ok(())
}

/// Write one BibTeX entry per record.
pub fn write_bibtex(path: &Path, records: &[PaperRecord]) -> Result<()> {
    let mut out = String::new();
    for record in records {
        out.push_str(&format_entry(record));
        out.push('\n');
    }
    std::fs::write(path, out)?;

    info!(path = %path.display(), entries = records.len(), "Wrote bibliography");
    Ok(())
}

/// Entry key: lowercased alphanumeric-only first author segment plus year.
///
/// Collisions are left unresolved, matching the observed corpus sizes where
/// they are rare and harmless.
pub fn bib_key(record: &PaperRecord) -> String {
    let first = record.authors.split(',').next().unwrap_or_default();
    let mut key: String = first
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if key.is_empty() {
        key = "unknown".to_string();
    }
    format!("{}{}", key, record.year)
}

/// Format a single `@misc` entry.
///
/// The author field joins multiple authors with `" and "` wherever the
/// source string used `", "`. arXiv records carry an `howpublished` URL
/// field, everything else a `journal` field.
pub fn format_entry(record: &PaperRecord) -> String {
    let author = record.authors.replace(", ", " and ");

    let mut fields: Vec<(&str, String)> = vec![
        ("title", record.title.clone()),
        ("author", author),
        ("year", record.year.to_string()),
        ("url", record.pdf_link.clone()),
    ];

    match record.source {
        Source::Arxiv => fields.push(("howpublished", format!("\\url{{{}}}", record.pdf_link))),
        Source::Scholar => fields.push(("journal", record.venue.clone())),
    }

    fields.push((
        "note",
        format!("[{}] Citations: {}", record.source, record.citations),
    ));

    let mut entry = format!("@misc{{{},\n", bib_key(record));
    for (name, value) in fields {
        entry.push_str(&format!("  {} = {{{}}},\n", name, value));
    }
    entry.push_str("}\n");
    entry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(source: Source) -> PaperRecord {
        PaperRecord {
            title: "Photon Cloud Classification".to_string(),
            authors: "J Smith, A Lee".to_string(),
            year: 2021,
            venue: "Remote Sensing".to_string(),
            citations: 42,
            abstract_text: "An abstract.".to_string(),
            pdf_link: "https://example.com/paper.pdf".to_string(),
            source,
        }
    }

    #[test]
    fn test_bib_key_strips_to_alphanumeric() {
        let record = paper(Source::Scholar);
        assert_eq!(bib_key(&record), "jsmith2021");
    }

    #[test]
    fn test_bib_key_falls_back_to_unknown() {
        let mut record = paper(Source::Scholar);
        record.authors = "...".to_string();
        assert_eq!(bib_key(&record), "unknown2021");
    }

    #[test]
    fn test_scholar_entry_has_journal_field() {
        let entry = format_entry(&paper(Source::Scholar));
        assert!(entry.starts_with("@misc{jsmith2021,"));
        assert!(entry.contains("author = {J Smith and A Lee}"));
        assert!(entry.contains("journal = {Remote Sensing}"));
        assert!(entry.contains("note = {[Google Scholar] Citations: 42}"));
        assert!(!entry.contains("howpublished"));
    }

    #[test]
    fn test_arxiv_entry_has_howpublished_field() {
        let entry = format_entry(&paper(Source::Arxiv));
        assert!(entry.contains("howpublished = {\\url{https://example.com/paper.pdf}}"));
        assert!(entry.contains("note = {[arXiv] Citations: 42}"));
        assert!(!entry.contains("journal"));
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("papers.csv");
        write_csv(&path, &[paper(Source::Scholar)])?;

        let bytes = std::fs::read(&path)?;
        assert_eq!(&bytes[..3], UTF8_BOM);

        let text = String::from_utf8_lossy(&bytes[3..]).to_string();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("title,authors,year,venue,citations,abstract,pdf_link,source")
        );
        let row = lines.next().expect("data row");
        assert!(row.contains("Photon Cloud Classification"));
        assert!(row.contains("Google Scholar"));
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn test_bibtex_file_has_one_block_per_record() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("papers.bib");
        write_bibtex(&path, &[paper(Source::Scholar), paper(Source::Arxiv)])?;

        let text = std::fs::read_to_string(&path)?;
        assert_eq!(text.matches("@misc{").count(), 2);
        Ok(())
    }
}
