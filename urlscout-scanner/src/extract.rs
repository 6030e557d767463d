use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// A parsed HTML document that yields the raw `href` of every anchor.
///
/// Parsing is permissive: broken markup never fails, it just produces fewer
/// (or zero) anchors.
pub struct LinkExtractor {
    document: Html,
}

impl LinkExtractor {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Raw `href` values in document order, verbatim.
    pub fn hrefs(&self) -> impl Iterator<Item = &str> + '_ {
        self.document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
    }
}

/// Extracts the raw `href` of every anchor element.
///
/// The returned iterator owns its values and can be consumed once. The
/// parsed document is dropped before returning, so the result can be held
/// across `.await` points.
pub fn extract_links(html: &str) -> std::vec::IntoIter<String> {
    let extractor = LinkExtractor::parse(html);
    let links: Vec<String> = extractor.hrefs().map(str::to_string).collect();
    links.into_iter()
}
