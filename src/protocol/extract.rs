//! HTML token extraction
//!
//! The portal's markup is not guaranteed to be well formed, so parsing never
//! fails; only a missing anchor is an error. All text is trimmed and inner
//! whitespace collapsed, including text spread over nested elements.

use crate::{Error, Result};
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// How to find a field in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator<'a> {
    /// Element with this `id` attribute
    Id(&'a str),
    /// First element matching a CSS selector
    Css(&'a str),
    /// Element right after the first element whose text equals the anchor,
    /// e.g. the `<td>` following a `<th>` label
    TextAnchor(&'a str),
}

impl fmt::Display for Locator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{}", id),
            Self::Css(css) => write!(f, "{}", css),
            Self::TextAnchor(text) => write!(f, "text:{}", text),
        }
    }
}

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Locate a single element
    pub fn find(&self, locator: &Locator<'_>) -> Result<ElementRef<'_>> {
        let found = match locator {
            Locator::Id(id) => {
                let selector = selector(&format!("[id=\"{}\"]", id))?;
                self.html.select(&selector).next()
            }
            Locator::Css(css) => {
                let selector = selector(css)?;
                self.html.select(&selector).next()
            }
            Locator::TextAnchor(anchor) => {
                let all = selector("*")?;
                self.html
                    .select(&all)
                    .find(|el| element_text(el) == *anchor)
                    .and_then(|label| label.next_siblings().find_map(ElementRef::wrap))
            }
        };

        found.ok_or_else(|| Error::extraction(locator.to_string()))
    }

    /// Normalised text of the located element
    pub fn text(&self, locator: &Locator<'_>) -> Result<String> {
        self.find(locator).map(|el| element_text(&el))
    }

    /// Attribute value of the located element
    pub fn attr(&self, locator: &Locator<'_>, name: &str) -> Result<String> {
        let element = self.find(locator)?;
        element
            .value()
            .attr(name)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| Error::extraction(format!("{}@{}", locator, name)))
    }

    /// Every element matching a CSS selector, in document order
    pub fn select_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = selector(css)?;
        Ok(self.html.select(&selector).collect())
    }
}

/// Collapse all whitespace in an element's descendant text
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Trim and join whitespace runs with a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Descendants of `element` matching `css`
pub fn select_within<'a>(element: &ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(element.select(&selector).collect())
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::internal(format!("Invalid selector {}: {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const LANDING: &str = r#"
        <html><body>
          <div class="content">
            <strong id="lottoDrwNo">
               1142
            </strong>
            <strong id="drwNo720"><span>231</span></strong>
            <p class="total_new">예치금 <strong> 12,000 <em>원</em></strong></p>
            <table>
              <tr><th> 예치금 </th><td>  12,000원 </td></tr>
            </table>
            <input type="hidden" id="ROUND_DRAW_DATE" value=" 2024/11/02 ">
          </div>
        "#;

    #[test]
    fn test_text_by_id_trims_whitespace() {
        let doc = Document::parse(LANDING);
        assert_eq!(doc.text(&Locator::Id("lottoDrwNo")).unwrap(), "1142");
    }

    #[test]
    fn test_text_through_nested_markup() {
        let doc = Document::parse(LANDING);
        assert_eq!(doc.text(&Locator::Id("drwNo720")).unwrap(), "231");
        assert_eq!(
            doc.text(&Locator::Css("p.total_new strong")).unwrap(),
            "12,000 원"
        );
    }

    #[test]
    fn test_text_anchor() {
        let doc = Document::parse(LANDING);
        assert_eq!(doc.text(&Locator::TextAnchor("예치금")).unwrap(), "12,000원");
    }

    #[test]
    fn test_attr() {
        let doc = Document::parse(LANDING);
        assert_eq!(
            doc.attr(&Locator::Id("ROUND_DRAW_DATE"), "value").unwrap(),
            "2024/11/02"
        );

        let err = doc.attr(&Locator::Id("ROUND_DRAW_DATE"), "data-x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionError);
    }

    #[test]
    fn test_missing_anchor_is_extraction_error() {
        let doc = Document::parse(LANDING);
        let err = doc.text(&Locator::Id("WAMT_PAY_TLMT_END_DT")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionError);
        assert!(err.to_string().contains("#WAMT_PAY_TLMT_END_DT"));
    }

    #[test]
    fn test_malformed_markup_does_not_fail() {
        let doc = Document::parse("<div><strong id='x'>7<p></div></table>");
        assert_eq!(doc.text(&Locator::Id("x")).unwrap(), "7");

        let empty = Document::parse("");
        assert!(empty.text(&Locator::Css("strong")).is_err());
    }

    #[test]
    fn test_select_all() {
        let doc = Document::parse(LANDING);
        let strongs = doc.select_all("strong").unwrap();
        assert_eq!(strongs.len(), 3);
        assert!(doc.select_all("table.missing td").unwrap().is_empty());
    }
}
