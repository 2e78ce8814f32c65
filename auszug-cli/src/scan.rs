//! Find statement PDFs under the given directories.

use std::path::PathBuf;

use anyhow::{Context, Result};
use auszug_core::FilenameMatcher;
use auszug_ingest::Document;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Walk every directory recursively and keep the files whose name matches a
/// known statement template. The result is sorted by path.
pub fn scan_dirs(dirs: &[PathBuf], matcher: &FilenameMatcher) -> Result<Vec<Document>> {
    let mut docs = Vec::new();
    for root in dirs {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("scanning {}", root.display()))?;
            if entry.file_type().is_dir() {
                info!("scanning {} ...", entry.path().display());
                continue;
            }
            match matcher.kind(entry.path()) {
                Some(kind) => docs.push(Document::new(entry.path(), kind)),
                None => debug!(path = %entry.path().display(), "not a statement, skipped"),
            }
        }
    }
    docs.sort_by(|a, b| a.path.cmp(&b.path));
    docs.dedup_by(|a, b| a.path == b.path);
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use auszug_core::DocumentKind;
    use std::fs;

    #[test]
    fn test_scan_picks_statements_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("visa").join("2019");
        fs::create_dir_all(&sub).unwrap();

        let modern = dir
            .path()
            .join("Kontoauszug_3_2024_vom_31.03.2024_zu_Konto_1010001491.pdf");
        let legacy = dir
            .path()
            .join("Kontoauszug_1010001491_Nr_2015_004_per_2015_04_02.pdf");
        let card = sub.join("Kreditkartenabrechnung_4930xxxxxxxx0815_per_2019_03_05.pdf");
        for p in [&modern, &legacy, &card] {
            fs::write(p, b"%PDF").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("Kontoauszug.pdf"), b"x").unwrap();

        let matcher = FilenameMatcher::new().unwrap();
        let docs = scan_dirs(&[dir.path().to_path_buf()], &matcher).unwrap();

        assert_eq!(docs.len(), 3);
        let kind_of = |p: &PathBuf| docs.iter().find(|d| &d.path == p).map(|d| d.kind);
        assert_eq!(kind_of(&modern), Some(DocumentKind::AccountModern));
        assert_eq!(kind_of(&legacy), Some(DocumentKind::AccountLegacy));
        assert_eq!(kind_of(&card), Some(DocumentKind::Card));
    }

    #[test]
    fn test_overlapping_roots_do_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("a");
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            sub.join("Kreditkartenabrechnung_4930xxxxxxxx0815_per_2019_03_05.pdf"),
            b"%PDF",
        )
        .unwrap();

        let matcher = FilenameMatcher::new().unwrap();
        let docs = scan_dirs(&[dir.path().to_path_buf(), sub.clone()], &matcher).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = FilenameMatcher::new().unwrap();
        assert!(scan_dirs(&[dir.path().join("nope")], &matcher).is_err());
    }
}
