//! In-memory index double and archive fixtures shared by pipeline tests.

use crate::opensearch::{DocumentIndex, IndexSummary, OpenSearchError};
use crate::pubmed::PubmedRecord;
use async_trait::async_trait;
use flate2::{Compression, write::GzEncoder};
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Upserting index keyed by PMID that records every bulk call.
#[derive(Default)]
pub(crate) struct MemoryIndex {
    documents: Mutex<BTreeMap<String, PubmedRecord>>,
    batches: Mutex<Vec<usize>>,
    fail_on_call: Option<usize>,
}

impl MemoryIndex {
    pub(crate) fn failing_on_call(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().expect("batches lock").clone()
    }

    pub(crate) fn write_count(&self) -> usize {
        self.batch_sizes().iter().sum()
    }

    pub(crate) fn documents(&self) -> BTreeMap<String, PubmedRecord> {
        self.documents.lock().expect("documents lock").clone()
    }

    pub(crate) fn document_count(&self) -> usize {
        self.documents.lock().expect("documents lock").len()
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn ensure_index(&self, _index: &str) -> Result<bool, OpenSearchError> {
        Ok(false)
    }

    async fn bulk_index(
        &self,
        _index: &str,
        records: &[PubmedRecord],
    ) -> Result<IndexSummary, OpenSearchError> {
        let call = {
            let mut batches = self.batches.lock().expect("batches lock");
            batches.push(records.len());
            batches.len()
        };
        if self.fail_on_call == Some(call) {
            return Err(OpenSearchError::BulkRejected {
                failed: records.len(),
                total: records.len(),
                reason: "simulated rejection".into(),
            });
        }

        let mut documents = self.documents.lock().expect("documents lock");
        let mut summary = IndexSummary::default();
        for record in records {
            match documents.insert(record.pmid.clone(), record.clone()) {
                Some(_) => summary.updated += 1,
                None => summary.created += 1,
            }
        }
        Ok(summary)
    }
}

/// `PubmedArticleSet` document with one article per PMID in `pmids`.
pub(crate) fn article_set_xml(pmids: RangeInclusive<u32>) -> String {
    let articles: String = pmids
        .map(|pmid| {
            format!(
                "<PubmedArticle><MedlineCitation><PMID Version=\"1\">{pmid}</PMID><Article>\
                 <ArticleTitle>Title {pmid}</ArticleTitle><Abstract>\
                 <AbstractText>Abstract {pmid}</AbstractText></Abstract></Article>\
                 </MedlineCitation></PubmedArticle>"
            )
        })
        .collect();
    format!("<?xml version=\"1.0\"?>\n<PubmedArticleSet>{articles}</PubmedArticleSet>")
}

/// Gzip `xml` into `dir/name` and return the path.
pub(crate) fn write_archive(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("create archive");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(xml.as_bytes()).expect("write archive");
    encoder.finish().expect("finish archive");
    path
}
