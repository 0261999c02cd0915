use std::sync::Arc;

use pubmed_indexer::{
    config::Config,
    opensearch::{DocumentIndex, OpenSearchService},
    pubmed::PubmedRecord,
};

fn live_config() -> Config {
    dotenvy::dotenv().ok();
    Config::from_env().expect("config from environment")
}

#[tokio::test]
#[ignore = "Requires live OpenSearch"]
async fn live_index_is_reachable() {
    let config = live_config();
    let client = OpenSearchService::new(&config).expect("client");
    client
        .ensure_index(&config.index_name)
        .await
        .expect("index should exist or be creatable");
}

#[tokio::test]
#[ignore = "Requires live OpenSearch"]
async fn live_bulk_upsert_overwrites_by_pmid() {
    let config = live_config();
    let client: Arc<dyn DocumentIndex> =
        Arc::new(OpenSearchService::new(&config).expect("client"));
    let record = PubmedRecord::new(
        "999999999",
        Some("pubmed-indexer live check".into()),
        None,
    );

    client
        .bulk_index(&config.index_name, std::slice::from_ref(&record))
        .await
        .expect("first write");
    let second = client
        .bulk_index(&config.index_name, std::slice::from_ref(&record))
        .await
        .expect("second write");
    assert_eq!(second.updated, 1, "resubmission must overwrite, not duplicate");
}
