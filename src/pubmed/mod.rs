//! PubMed XML extraction: `PubmedArticleSet` documents to normalized records.

pub mod extract;
pub mod types;
mod xml;

pub use extract::{ARTICLE_SET_TAG, parse_article_set};
pub use types::{ExtractError, PUBMED_URL_PREFIX, PubmedRecord, RecordKind, pubmed_url};
