//! Parse many documents on a fixed number of worker tasks.
//!
//! Documents are independent, so each worker gets its own share up front and
//! keeps its own report; the reports are merged once every worker is done.
//! The merged order is unspecified.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use auszug_core::{FilenameMatcher, ParseError, ParsedStatement, Transaction};
use tokio::task::JoinError;
use tracing::warn;

use crate::document::{read_document, Document};
use crate::extract::Extractor;

/// A document that could not be parsed.
#[derive(Debug)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: ParseError,
}

/// Successes and failures of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub parsed: Vec<ParsedStatement>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.parsed.iter().flat_map(|p| p.transactions.iter())
    }

    pub fn transaction_count(&self) -> usize {
        self.parsed.iter().map(|p| p.transactions.len()).sum()
    }

    /// Statements whose bookings did not add up.
    pub fn mismatched(&self) -> impl Iterator<Item = &ParsedStatement> {
        self.parsed
            .iter()
            .filter(|p| p.reconciliation.discrepancy().is_some())
    }

    fn merge(&mut self, other: BatchReport) {
        self.parsed.extend(other.parsed);
        self.failures.extend(other.failures);
    }
}

/// Run `load` over every document on `jobs` workers.
pub async fn run_batch<F, Fut>(
    documents: Vec<Document>,
    jobs: usize,
    load: F,
) -> Result<BatchReport, JoinError>
where
    F: Fn(Document) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ParsedStatement, ParseError>> + Send + 'static,
{
    let jobs = jobs.max(1);
    let mut shares: Vec<Vec<Document>> = (0..jobs).map(|_| Vec::new()).collect();
    for (i, doc) in documents.into_iter().enumerate() {
        shares[i % jobs].push(doc);
    }

    let load = Arc::new(load);
    let mut workers = Vec::with_capacity(jobs);
    for share in shares.into_iter().filter(|s| !s.is_empty()) {
        let load = Arc::clone(&load);
        workers.push(tokio::spawn(async move {
            let mut report = BatchReport::default();
            for doc in share {
                let path = doc.path.clone();
                match load(doc).await {
                    Ok(parsed) => report.parsed.push(parsed),
                    Err(error) => {
                        warn!(source = %path.display(), kind = error.kind(), "skipping document: {error}");
                        report.failures.push(DocumentFailure { path, error });
                    }
                }
            }
            report
        }));
    }

    let mut merged = BatchReport::default();
    for worker in workers {
        merged.merge(worker.await?);
    }
    Ok(merged)
}

/// Extract and parse `documents` from disk.
pub async fn parse_documents(
    documents: Vec<Document>,
    jobs: usize,
    matcher: Arc<FilenameMatcher>,
    extractor: Extractor,
) -> Result<BatchReport, JoinError> {
    run_batch(documents, jobs, move |doc| {
        let matcher = Arc::clone(&matcher);
        let extractor = extractor.clone();
        async move { read_document(&doc, &matcher, &extractor).await }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use auszug_core::DocumentKind;

    const CARD: &str = "     Abrechnung: Mai 2020\n\
                        VISA Card-Nummer: 4930 12XX XXXX 0815\n\
                        01.05.20  02.05.20  BAECKEREI    3,20 -\n\
                        Neuer Saldo   3,20 -\n";

    #[tokio::test]
    async fn test_failures_do_not_abort_batch() {
        let docs: Vec<Document> = (0..7)
            .map(|i| Document::new(format!("doc-{i}.pdf"), DocumentKind::Card))
            .collect();

        let report = run_batch(docs, 3, |doc: Document| async move {
            if doc.path.to_string_lossy().contains('3') {
                Err(ParseError::Extraction("no text".to_string()))
            } else {
                crate::parsers::parse_card_statement(&doc.path.to_string_lossy(), CARD)
            }
        })
        .await
        .unwrap();

        assert_eq!(report.parsed.len(), 6);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("doc-3.pdf"));
        assert_eq!(report.transaction_count(), 6);
        assert_eq!(report.mismatched().count(), 0);
    }

    #[tokio::test]
    async fn test_more_workers_than_documents() {
        let docs = vec![Document::new("only.pdf", DocumentKind::Card)];
        let report = run_batch(docs, 8, |doc: Document| async move {
            crate::parsers::parse_card_statement(&doc.path.to_string_lossy(), CARD)
        })
        .await
        .unwrap();
        assert_eq!(report.parsed.len(), 1);
        assert!(report.failures.is_empty());
    }
}
