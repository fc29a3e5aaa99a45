//! Batch orchestration over fake and real page text providers.

use std::collections::HashMap;

use cardstmt_core::pdf::Result as PdfResult;
use cardstmt_core::{
    BatchOrchestrator, CardstmtConfig, PageTextProvider, ParseFailure, PdfError, PdfFileProvider, ProfileRegistry,
};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use pretty_assertions::assert_eq;

const HDFC_PAGE: &str = "HDFC Bank\n\
    Card ending 5678\n\
    Statement Period: 05/01/2024 to 04/02/2024\n\
    Payment Due Date: 20/02/2024\n\
    Total Amount Due: 45,230.50\n\
    06/01/2024 SWIGGY 450.00\n";

/// Serves page text from memory; unknown references are unreadable.
struct FakeProvider {
    documents: HashMap<String, Vec<String>>,
}

impl FakeProvider {
    fn new(documents: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|(name, pages)| (name.to_string(), pages.into_iter().map(String::from).collect()))
                .collect(),
        }
    }
}

impl PageTextProvider for FakeProvider {
    fn page_texts(&self, source_reference: &str) -> PdfResult<Vec<String>> {
        self.documents
            .get(source_reference)
            .cloned()
            .ok_or(PdfError::Encrypted)
    }
}

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn mixed_batch_reconciles_in_input_order() {
    let registry = ProfileRegistry::builtin();
    let provider = FakeProvider::new(vec![
        ("unknown.pdf", vec!["Monthly statement from a bank nobody has heard of"]),
        ("hdfc.pdf", vec![HDFC_PAGE]),
    ]);
    let input = sources(&["locked.pdf", "unknown.pdf", "hdfc.pdf"]);

    for jobs in [1, 3] {
        let report = BatchOrchestrator::new(&registry, &provider).with_jobs(jobs).run(&input);

        assert_eq!(report.total_processed, 3);
        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 2);

        let order: Vec<&str> = report.details.iter().map(|d| d.source_reference.as_str()).collect();
        assert_eq!(order, vec!["locked.pdf", "unknown.pdf", "hdfc.pdf"]);

        assert_eq!(
            report.details[0].failure,
            Some(ParseFailure::DocumentUnreadable {
                source_reference: "locked.pdf".to_string(),
                cause: "PDF is encrypted".to_string(),
            })
        );
        assert_eq!(report.details[1].failure, Some(ParseFailure::UnknownBank));

        let record = report.details[2].record.as_ref().unwrap();
        assert_eq!(record.card_last4(), "5678");
        assert_eq!(report.details[2].bank_name.as_deref(), Some("HDFC Bank"));
    }
}

#[test]
fn parallel_batch_preserves_order_for_many_documents() {
    let registry = ProfileRegistry::builtin();
    let names: Vec<String> = (0..25).map(|i| format!("doc-{:02}.pdf", i)).collect();
    let entries: Vec<(&str, Vec<&str>)> = names
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, n)| (n.as_str(), vec![HDFC_PAGE]))
        .collect();
    let provider = FakeProvider::new(entries);

    let report = BatchOrchestrator::new(&registry, &provider).with_jobs(4).run(&names);

    let order: Vec<&String> = report.details.iter().map(|d| &d.source_reference).collect();
    assert_eq!(order, names.iter().collect::<Vec<_>>());
    assert_eq!(report.failed, 9);
    assert_eq!(report.successful, 16);
    for (i, detail) in report.details.iter().enumerate() {
        assert_eq!(detail.success, i % 3 != 0, "{}", detail.source_reference);
    }
}

/// Panics while extracting one reference, delegating the rest.
struct PanickingProvider {
    inner: FakeProvider,
    panics_on: &'static str,
}

impl PageTextProvider for PanickingProvider {
    fn page_texts(&self, source_reference: &str) -> PdfResult<Vec<String>> {
        if source_reference == self.panics_on {
            panic!("corrupt xref table");
        }
        self.inner.page_texts(source_reference)
    }
}

#[test]
fn panicking_document_fails_alone() {
    let registry = ProfileRegistry::builtin();
    let names = ["a.pdf", "b.pdf", "c.pdf", "bad.pdf", "e.pdf"];
    let entries: Vec<(&str, Vec<&str>)> = names
        .iter()
        .filter(|n| **n != "bad.pdf")
        .map(|n| (*n, vec![HDFC_PAGE]))
        .collect();
    let provider = PanickingProvider {
        inner: FakeProvider::new(entries),
        panics_on: "bad.pdf",
    };
    let input = sources(&names);

    for jobs in [1, 2] {
        let report = BatchOrchestrator::new(&registry, &provider).with_jobs(jobs).run(&input);

        assert_eq!(report.successful, 4, "jobs={}", jobs);
        assert_eq!(report.failed, 1, "jobs={}", jobs);
        let order: Vec<&str> = report.details.iter().map(|d| d.source_reference.as_str()).collect();
        assert_eq!(order, names.to_vec());

        match &report.details[3].failure {
            Some(ParseFailure::DocumentUnreadable { source_reference, cause }) => {
                assert_eq!(source_reference, "bad.pdf");
                assert!(cause.contains("corrupt xref table"), "{}", cause);
            }
            other => panic!("unexpected failure {:?}", other),
        }
    }
}

#[test]
fn ledger_spans_page_breaks() {
    let registry = ProfileRegistry::builtin();
    let provider = FakeProvider::new(vec![(
        "two-pages.pdf",
        vec![
            "HDFC Bank\n\
             Card ending 5678\n\
             Statement Period: 05/01/2024 to 04/02/2024\n\
             Payment Due Date: 20/02/2024\n\
             Total Amount Due: 45,230.50\n\
             06/01/2024 SWIGGY 450.00\n\
             08/01/2024 AMAZON 1,299.00\n\
             Page 1 of 2\n",
            "Date Transaction Description Amount\n\
             09/01/2024 UBER 210.50\n\
             10/01/2024 ZOMATO 320.00\n\
             Page 2 of 2\n",
        ],
    )]);

    let report = BatchOrchestrator::new(&registry, &provider).run(&sources(&["two-pages.pdf"]));

    let detail = &report.details[0];
    let descriptions: Vec<&str> = detail
        .record
        .as_ref()
        .unwrap()
        .transactions()
        .iter()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["SWIGGY", "AMAZON", "UBER", "ZOMATO"]);
    assert!(detail.warnings.is_empty(), "{:?}", detail.warnings);
}

#[test]
fn detection_only_reads_leading_pages() {
    let registry = ProfileRegistry::builtin();
    let provider = FakeProvider::new(vec![("late.pdf", vec!["Statement", "Summary", HDFC_PAGE])]);
    let input = sources(&["late.pdf"]);

    let narrow = BatchOrchestrator::new(&registry, &provider).run(&input);
    assert_eq!(narrow.details[0].failure, Some(ParseFailure::UnknownBank));

    let wide = BatchOrchestrator::new(&registry, &provider)
        .with_detection_pages(3)
        .run(&input);
    assert!(wide.details[0].success);
}

#[test]
fn report_serializes_with_counts_and_details() {
    let registry = ProfileRegistry::builtin();
    let provider = FakeProvider::new(vec![("hdfc.pdf", vec![HDFC_PAGE])]);
    let report = BatchOrchestrator::new(&registry, &provider).run(&sources(&["hdfc.pdf", "missing.pdf"]));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["total_processed"], 2);
    assert_eq!(json["successful"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["details"][0]["record"]["card_last4"], "5678");
    assert_eq!(json["details"][1]["failure"]["kind"], "document_unreadable");
}

/// One text object per line, one page per slice.
fn statement_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
            operations.push(Operation::new("Td", vec![40.into(), (800 - 14 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, Content { operations }.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

#[test]
fn pdf_files_run_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("hdfc.pdf");
    let bad = dir.path().join("broken.pdf");
    std::fs::write(
        &good,
        statement_pdf(&[
            &[
                "HDFC Bank Credit Card Statement",
                "Card ending 5678",
                "Statement Period: 05/01/2024 to 04/02/2024",
                "Payment Due Date: 20/02/2024",
                "Total Amount Due: 45,230.50",
            ],
            &["06/01/2024 SWIGGY 450.00", "08/01/2024 AMAZON 1,299.00"],
        ]),
    )
    .unwrap();
    std::fs::write(&bad, b"%PDF-1.4 truncated").unwrap();

    let config = CardstmtConfig::default();
    let registry = config.build_registry().unwrap();
    let provider: PdfFileProvider = config.pdf_provider();
    let input = vec![
        good.to_string_lossy().to_string(),
        bad.to_string_lossy().to_string(),
    ];

    let report = BatchOrchestrator::new(&registry, &provider)
        .with_jobs(config.batch.jobs)
        .with_detection_pages(config.pdf.max_detection_pages)
        .run(&input);

    assert_eq!(report.successful, 1);
    let record = report.details[0].record.as_ref().unwrap();
    assert_eq!(record.total_amount_due().to_string(), "45230.50");
    assert_eq!(record.transactions().len(), 2);
    assert!(matches!(
        report.details[1].failure,
        Some(ParseFailure::DocumentUnreadable { .. })
    ));
}
