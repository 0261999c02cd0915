//! Extraction rules for `PubmedArticleSet` documents.

use super::types::{ExtractError, PubmedRecord, RecordKind};
use super::xml::{ChildElements, XmlElement};

/// Root tag every PubMed archive must carry.
pub const ARTICLE_SET_TAG: &str = "PubmedArticleSet";

/// Parse a decompressed PubMed archive into records, in document order.
///
/// `PubmedArticle` and `PubmedBookArticle` children become records, `DeleteCitation` and
/// unrecognized children are skipped. A wrong root, malformed XML, or a record without a PMID
/// fails the whole document.
pub fn parse_article_set(xml: &[u8]) -> Result<Vec<PubmedRecord>, ExtractError> {
    let mut children = ChildElements::open(xml, ARTICLE_SET_TAG)?;
    let mut records = Vec::new();
    let mut position = 0;

    while let Some(element) = children.next_element()? {
        position += 1;
        let record = match RecordKind::from_tag(&element.name) {
            RecordKind::Article => extract_article(&element, position)?,
            RecordKind::BookArticle => extract_book_article(&element, position)?,
            RecordKind::DeletionMarker => {
                tracing::trace!(position, "Skipping DeleteCitation");
                continue;
            }
            RecordKind::Unknown => {
                tracing::debug!(tag = %element.name, position, "Ignoring unrecognized element");
                continue;
            }
        };
        records.push(record);
    }

    Ok(records)
}

fn extract_article(element: &XmlElement, position: usize) -> Result<PubmedRecord, ExtractError> {
    let pmid = extract_pmid(element, position)?;
    let title = element.descendant("ArticleTitle").and_then(non_empty_text);
    let abstract_text = element.descendant("Abstract").and_then(abstract_from);
    Ok(PubmedRecord::new(pmid, title, abstract_text))
}

fn extract_book_article(
    element: &XmlElement,
    position: usize,
) -> Result<PubmedRecord, ExtractError> {
    let pmid = extract_pmid(element, position)?;
    let Some(document) = element.child("BookDocument") else {
        return Ok(PubmedRecord::new(pmid, None, None));
    };

    let title = first_non_empty([
        document.child("ArticleTitle"),
        document.child("VernacularTitle"),
        document
            .child("Book")
            .and_then(|book| book.child("BookTitle")),
    ]);
    let abstract_text = document.child("Abstract").and_then(abstract_from);
    Ok(PubmedRecord::new(pmid, title, abstract_text))
}

fn extract_pmid(element: &XmlElement, position: usize) -> Result<String, ExtractError> {
    element
        .descendant("PMID")
        .and_then(non_empty_text)
        .ok_or_else(|| ExtractError::MissingIdentifier {
            tag: element.name.clone(),
            position,
        })
}

fn abstract_from(container: &XmlElement) -> Option<String> {
    join_segments(
        container
            .descendants("AbstractText")
            .into_iter()
            .map(|segment| Some(segment.text_content())),
    )
}

/// Join abstract segments with single spaces, skipping absent and blank segments.
pub(crate) fn join_segments<I, S>(segments: I) -> Option<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for segment in segments.into_iter().flatten() {
        let text = segment.as_ref().trim();
        if text.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(text);
    }
    if joined.is_empty() { None } else { Some(joined) }
}

fn first_non_empty<const N: usize>(candidates: [Option<&XmlElement>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find_map(non_empty_text)
}

fn non_empty_text(element: &XmlElement) -> Option<String> {
    let text = element.text_content();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
