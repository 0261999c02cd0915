//! Helpers for constructing OpenSearch request bodies.

use crate::pubmed::PubmedRecord;
use serde_json::{Value, json};

/// Index settings and field mappings applied when the index is created.
pub(crate) fn index_definition() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "title": { "type": "text", "analyzer": "english" },
                "abstract": { "type": "text", "analyzer": "english" },
                "url": { "type": "keyword" },
                "pmid": { "type": "keyword" }
            }
        }
    })
}

/// Build the NDJSON body for a `_bulk` request.
///
/// Each record becomes an `index` action keyed by its PMID followed by the document source, so
/// resubmitting a record overwrites the earlier copy.
pub(crate) fn build_bulk_body(
    index: &str,
    records: &[PubmedRecord],
) -> Result<String, serde_json::Error> {
    let mut body = String::new();
    for record in records {
        let action = json!({ "index": { "_index": index, "_id": record.pmid } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(record)?);
        body.push('\n');
    }
    Ok(body)
}
