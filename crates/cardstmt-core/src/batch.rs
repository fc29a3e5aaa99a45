//! Batch orchestration: many documents through detection and parsing.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::detect::{BankDetector, DEFAULT_DETECTION_PAGES};
use crate::error::ParseFailure;
use crate::models::report::{BatchReport, DocumentOutcome};
use crate::pdf::PageTextProvider;
use crate::profiles::ProfileRegistry;
use crate::statement::StatementParser;

/// Drives documents through text extraction, detection and parsing.
///
/// A failing document is recorded and never stops the run, including one
/// whose extraction or parsing panics. With more than one job, workers pull
/// documents from a shared cursor and keep their own `(index, outcome)`
/// lists, which are merged back into input order.
pub struct BatchOrchestrator<'a> {
    registry: &'a ProfileRegistry,
    provider: &'a dyn PageTextProvider,
    parser: StatementParser,
    detection_pages: usize,
    jobs: usize,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(registry: &'a ProfileRegistry, provider: &'a dyn PageTextProvider) -> Self {
        Self {
            registry,
            provider,
            parser: StatementParser::new(),
            detection_pages: DEFAULT_DETECTION_PAGES,
            jobs: 1,
        }
    }

    /// Set the number of worker threads (at least one).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set how many leading pages are used for bank detection.
    pub fn with_detection_pages(mut self, pages: usize) -> Self {
        self.detection_pages = pages.max(1);
        self
    }

    pub fn with_parser(mut self, parser: StatementParser) -> Self {
        self.parser = parser;
        self
    }

    /// Process one document.
    ///
    /// A panic is caught and reported as this document's failure.
    pub fn process(&self, source_reference: &str) -> DocumentOutcome {
        let start = Instant::now();
        let elapsed = || start.elapsed().as_millis() as u64;
        info!("Processing {}", source_reference);

        let pages = match panic::catch_unwind(AssertUnwindSafe(|| self.provider.page_texts(source_reference))) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                warn!("{}: unreadable: {}", source_reference, e);
                let failure = ParseFailure::DocumentUnreadable {
                    source_reference: source_reference.to_string(),
                    cause: e.to_string(),
                };
                return DocumentOutcome::failed(source_reference, None, failure, elapsed());
            }
            Err(payload) => {
                let cause = format!("text extraction panicked: {}", panic_message(&*payload));
                warn!("{}: {}", source_reference, cause);
                let failure = ParseFailure::DocumentUnreadable {
                    source_reference: source_reference.to_string(),
                    cause,
                };
                return DocumentOutcome::failed(source_reference, None, failure, elapsed());
            }
        };
        debug!("{}: {} pages of text", source_reference, pages.len());

        match panic::catch_unwind(AssertUnwindSafe(|| self.process_pages(source_reference, &pages))) {
            Ok(mut outcome) => {
                outcome.processing_time_ms = elapsed();
                outcome
            }
            Err(payload) => {
                let reason = format!("processing panicked: {}", panic_message(&*payload));
                warn!("{}: {}", source_reference, reason);
                let failure = ParseFailure::UnparseableDocument { reason };
                DocumentOutcome::failed(source_reference, None, failure, elapsed())
            }
        }
    }

    fn process_pages(&self, source_reference: &str, pages: &[String]) -> DocumentOutcome {
        let detector = BankDetector::new(self.registry).with_max_pages(self.detection_pages);
        let Some(profile) = detector.detect(pages).profile() else {
            warn!("{}: could not detect bank", source_reference);
            return DocumentOutcome::failed(source_reference, None, ParseFailure::UnknownBank, 0);
        };

        match self.parser.parse_pages(pages, profile, source_reference) {
            Ok(result) => DocumentOutcome::succeeded(source_reference, result),
            Err(failure) => {
                warn!("{}: {}", source_reference, failure);
                DocumentOutcome::failed(source_reference, Some(profile.name().to_string()), failure, 0)
            }
        }
    }

    /// Process every document and aggregate the outcomes.
    pub fn run(&self, sources: &[String]) -> BatchReport {
        self.run_with_progress(sources, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_done` as each document finishes.
    pub fn run_with_progress<F>(&self, sources: &[String], on_done: F) -> BatchReport
    where
        F: Fn(&DocumentOutcome) + Sync,
    {
        let jobs = self.jobs.min(sources.len()).max(1);
        info!("Processing {} documents with {} jobs", sources.len(), jobs);

        let details = if jobs == 1 {
            sources
                .iter()
                .map(|source| {
                    let outcome = self.process(source);
                    on_done(&outcome);
                    outcome
                })
                .collect()
        } else {
            self.run_parallel(sources, jobs, &on_done)
        };

        let report = BatchReport::from_outcomes(details);
        info!(
            "Batch finished: {} processed, {} successful, {} failed",
            report.total_processed, report.successful, report.failed
        );
        report
    }

    fn run_parallel<F>(&self, sources: &[String], jobs: usize, on_done: &F) -> Vec<DocumentOutcome>
    where
        F: Fn(&DocumentOutcome) + Sync,
    {
        let cursor = AtomicUsize::new(0);

        let worker = || {
            let mut done = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(source) = sources.get(index) else {
                    break;
                };
                let outcome = self.process(source);
                on_done(&outcome);
                done.push((index, outcome));
            }
            done
        };

        let mut done: Vec<(usize, DocumentOutcome)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..jobs).map(|_| scope.spawn(worker)).collect();
            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(done) => done,
                    // Only `on_done` can get here; documents are isolated in `process`
                    Err(payload) => panic::resume_unwind(payload),
                })
                .collect()
        });

        done.sort_by_key(|(index, _)| *index);
        done.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use std::collections::HashMap;

    struct MapProvider(HashMap<String, Vec<String>>);

    impl PageTextProvider for MapProvider {
        fn page_texts(&self, source_reference: &str) -> crate::pdf::Result<Vec<String>> {
            self.0.get(source_reference).cloned().ok_or(PdfError::NoPages)
        }
    }

    #[test]
    fn test_unreadable_document_keeps_reference() {
        let registry = ProfileRegistry::builtin();
        let provider = MapProvider(HashMap::new());
        let outcome = BatchOrchestrator::new(&registry, &provider).process("gone.pdf");

        assert!(!outcome.success);
        assert_eq!(
            outcome.failure,
            Some(ParseFailure::DocumentUnreadable {
                source_reference: "gone.pdf".to_string(),
                cause: "PDF has no pages".to_string(),
            })
        );
    }

    #[test]
    fn test_failed_parse_keeps_bank_name() {
        let registry = ProfileRegistry::builtin();
        let provider = MapProvider(HashMap::from([(
            "axis.pdf".to_string(),
            vec!["Axis Bank credit card statement".to_string()],
        )]));
        let outcome = BatchOrchestrator::new(&registry, &provider).process("axis.pdf");

        assert_eq!(outcome.bank_name.as_deref(), Some("Axis Bank"));
        assert!(matches!(outcome.failure, Some(ParseFailure::IncompleteStatement { .. })));
    }

    #[test]
    fn test_empty_batch() {
        let registry = ProfileRegistry::builtin();
        let provider = MapProvider(HashMap::new());
        let report = BatchOrchestrator::new(&registry, &provider).with_jobs(4).run(&[]);

        assert_eq!(report.total_processed, 0);
        assert!(report.details.is_empty());
    }
}
