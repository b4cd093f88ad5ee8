//! Article body extraction with a layered fallback chain.
//!
//! Sites vary wildly in markup, so extraction trades precision for recall
//! in stages: a semantic container match is most likely to be just the
//! article; joining every paragraph catches pages with no recognizable
//! container; the whole body text is a last resort that is non-empty
//! whenever the page has any text at all. Each stage runs only if the
//! previous one failed to clear its length bar.
//!
//! Before any strategy runs, non-content elements (scripts, navigation,
//! ads, cookie banners) are pruned from the parsed tree once, so every
//! stage sees the same cleaned document.

pub mod metadata;

use crate::config::PipelineConfig;
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Elements that never contribute article prose, removed before extraction.
const STRIP_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "nav",
    "footer",
    "header",
    "aside",
    ".sidebar",
    ".nav",
    ".navigation",
    ".menu",
    ".footer",
    ".header",
    ".ad",
    ".ads",
    ".advertisement",
    ".cookie-banner",
    ".cookie-consent",
    ".popup",
    ".modal",
    ".newsletter-signup",
];

/// Semantic/structural containers likely to hold the article body, in
/// decreasing order of precision.
const CONTAINER_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    ".article-body",
    ".article-content",
    ".story-body",
    ".post-content",
    ".entry-content",
    ".post-body",
    ".content",
    "#content",
];

/// Extract the article body text from rendered markup.
///
/// Runs the pruning pass followed by the container → paragraph →
/// whole-body fallback chain. The returned text is raw (un-normalized);
/// callers hand it to [`crate::normalize::normalize`]. May be empty when
/// the page has no text at all.
///
/// # Arguments
///
/// * `html` - Fully rendered page markup
/// * `config` - Length thresholds for the fallback chain
#[instrument(level = "debug", skip_all)]
pub fn extract_content(html: &str, config: &PipelineConfig) -> String {
    let mut document = Html::parse_document(html);
    strip_non_content(&mut document);

    if let Some(text) = container_text(&document, config.container_min_chars) {
        debug!(chars = text.chars().count(), "Container strategy matched");
        return text;
    }

    let paragraphs = paragraph_text(&document);
    if paragraphs.chars().count() >= config.paragraph_min_chars {
        debug!(
            chars = paragraphs.chars().count(),
            "Paragraph strategy matched"
        );
        return paragraphs;
    }

    let body = body_text(&document);
    debug!(chars = body.chars().count(), "Fell through to whole body");
    body
}

/// Detach every non-content element from the parsed tree.
///
/// This runs once per document; all extraction strategies operate on the
/// pruned tree.
fn strip_non_content(document: &mut Html) {
    for selector_str in STRIP_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

/// Try each container selector in order; accept the first whose full text
/// exceeds `min_chars`.
fn container_text(document: &Html, min_chars: usize) -> Option<String> {
    for selector_str in CONTAINER_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            if text.chars().count() > min_chars {
                return Some(text);
            }
        }
    }
    None
}

/// Concatenate the text of every paragraph element, space-joined.
fn paragraph_text(document: &Html) -> String {
    let selector = Selector::parse("p").unwrap();
    document
        .select(&selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full body text, the guaranteed-non-empty last resort.
fn body_text(document: &Html) -> String {
    let selector = Selector::parse("body").unwrap();
    match document.select(&selector).next() {
        Some(body) => body.text().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_container_wins_over_paragraphs() {
        // Container holds 250+ chars, loose paragraphs only 50: precision
        // beats recall.
        let body = "x".repeat(250);
        let html = format!(
            "<html><body>\
             <article>{body}</article>\
             <p>fifty chars of loose paragraph text padding here</p>\
             </body></html>"
        );

        let text = extract_content(&html, &config());
        assert!(text.contains(&body));
        assert!(!text.contains("loose paragraph"));
    }

    #[test]
    fn test_paragraphs_when_no_container_clears_threshold() {
        let para = "y".repeat(150);
        let html = format!(
            "<html><body>\
             <article>too short</article>\
             <p>{para}</p><p>{para}</p>\
             </body></html>"
        );

        let text = extract_content(&html, &config());
        assert!(text.contains(&para));
    }

    #[test]
    fn test_whole_body_as_last_resort() {
        // No containers, no paragraphs: the body text still comes back.
        let html = "<html><body><div>just a short div of text</div></body></html>";
        let text = extract_content(html, &config());
        assert!(text.contains("just a short div"));
    }

    #[test]
    fn test_scripts_and_nav_are_stripped() {
        let body = "z".repeat(250);
        let html = format!(
            "<html><body>\
             <nav>Home News Sports Weather</nav>\
             <script>var tracking = true;</script>\
             <article>{body}</article>\
             <footer>Copyright</footer>\
             </body></html>"
        );

        let text = extract_content(&html, &config());
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Sports"));
        assert!(!text.contains("Copyright"));
        assert!(text.contains(&body));
    }

    #[test]
    fn test_stripping_applies_to_fallback_stages_too() {
        let html = "<html><body>\
             <script>var x = 1;</script>\
             <div>short body text</div>\
             </body></html>";
        let text = extract_content(html, &config());
        assert!(!text.contains("var x"));
        assert!(text.contains("short body text"));
    }

    #[test]
    fn test_containers_tried_in_listed_order() {
        let in_article = "a".repeat(250);
        let in_content = "b".repeat(250);
        let html = format!(
            "<html><body>\
             <div class=\"content\">{in_content}</div>\
             <article>{in_article}</article>\
             </body></html>"
        );

        // `article` is listed before `.content`, so it wins regardless of
        // document position.
        let text = extract_content(&html, &config());
        assert!(text.contains(&in_article));
        assert!(!text.contains(&in_content));
    }

    #[test]
    fn test_empty_page_yields_empty_string() {
        let text = extract_content("<html><body></body></html>", &config());
        assert_eq!(text.trim(), "");
    }
}
