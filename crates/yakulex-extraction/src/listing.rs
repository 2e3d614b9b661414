//! Structural matcher for the regulatory listing page.
//!
//! The listing renders one row (`<li>`) per approved change, grouped into
//! tables whose cells also carry the links to the review documents. The
//! matcher finds the first row whose flattened text contains the target
//! label, walks up to the nearest enclosing `<table>`, and collects every
//! hyperlink inside it.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use yakulex_common::error::YakulexError;

use crate::models::{DocumentReference, MatchResult};

/// Locate the listing row matching `target_label` and collect its document
/// references. First matching row wins; scanning stops there.
pub fn locate(html: &str, target_label: &str, base: &Url) -> Result<MatchResult, YakulexError> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("li").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    for row in document.select(&row_selector) {
        let title = flattened_text(&row);
        if !title.contains(target_label) {
            continue;
        }

        let table = row
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "table");

        let mut references = Vec::new();
        if let Some(table) = table {
            for link in table.select(&link_selector) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                match base.join(href) {
                    Ok(url) => references.push(DocumentReference {
                        label: flattened_text(&link),
                        url,
                        excerpt: None,
                    }),
                    Err(e) => {
                        warn!(href, error = %e, "skipping reference with unresolvable href");
                    }
                }
            }
        } else {
            debug!(title = %title, "matched row has no enclosing table");
        }

        return Ok(MatchResult { title, references });
    }

    Err(YakulexError::NotFound(format!(
        "no listing row matches label {target_label:?}"
    )))
}

/// First PDF link on a page, resolved against the page address. Used by the
/// companion render endpoint.
pub fn first_document_link(html: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"a[href$=".pdf"]"#).unwrap();

    document
        .select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .find_map(|href| page_url.join(href).ok())
}

fn flattened_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
