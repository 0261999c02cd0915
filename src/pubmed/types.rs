//! Record and error types produced by the PubMed extractor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of the public PubMed page for an identifier.
pub const PUBMED_URL_PREFIX: &str = "https://pubmed.ncbi.nlm.nih.gov/";

/// Errors raised while turning an archive's XML into records.
///
/// Any of these fails the whole document; callers never see a partial record list.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The XML was not well formed or could not be unescaped.
    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The document ended before any root element was found.
    #[error("Document has no root element")]
    MissingRoot,
    /// The root element was not the expected article set.
    #[error("Root element is '{found}', expected '{expected}'")]
    UnexpectedRoot {
        /// Tag name of the root that was found.
        found: String,
        /// Tag name that was required.
        expected: &'static str,
    },
    /// The document ended inside an open element.
    #[error("Unexpected end of document inside '{0}'")]
    UnexpectedEof(String),
    /// A record element carried no usable PMID.
    #[error("{tag} element #{position} has no PMID")]
    MissingIdentifier {
        /// Tag name of the offending record element.
        tag: String,
        /// One-based position among the root's children.
        position: usize,
    },
}

/// One normalized bibliographic entry, also the document body sent to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubmedRecord {
    /// Article title, if the record has one.
    pub title: Option<String>,
    /// Abstract segments joined with single spaces.
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// PubMed identifier; never empty.
    pub pmid: String,
    /// Public PubMed page for the record.
    pub url: String,
}

impl PubmedRecord {
    /// Build a record, deriving its URL from the identifier.
    pub fn new(pmid: impl Into<String>, title: Option<String>, abstract_text: Option<String>) -> Self {
        let pmid = pmid.into();
        let url = pubmed_url(&pmid);
        Self {
            title,
            abstract_text,
            pmid,
            url,
        }
    }
}

/// Public PubMed URL for an identifier.
pub fn pubmed_url(pmid: &str) -> String {
    format!("{PUBMED_URL_PREFIX}{pmid}/")
}

/// Kind of a direct child of `PubmedArticleSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// `PubmedArticle`: journal article.
    Article,
    /// `PubmedBookArticle`: book or book chapter.
    BookArticle,
    /// `DeleteCitation`: retraction of earlier records, not acted upon.
    DeletionMarker,
    /// Any other element, ignored.
    Unknown,
}

impl RecordKind {
    /// Classify a child element by its tag name.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "PubmedArticle" => Self::Article,
            "PubmedBookArticle" => Self::BookArticle,
            "DeleteCitation" => Self::DeletionMarker,
            _ => Self::Unknown,
        }
    }
}
