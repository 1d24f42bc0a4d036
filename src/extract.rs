//! Turning raw AniSearch pages into raw field strings.
//!
//! [`PageExtractor`] is deliberately dumb: it returns whatever text it finds
//! (or an empty string) and leaves parsing, rescaling, and cleanup to the
//! metadata assembler. [`HtmlExtractor`] is the scraper-based implementation
//! for the live site.

use anisearch_common::{CatalogId, Error, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// All raw fields of a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    pub title: String,
    pub overview: String,
    pub rating: String,
    pub genres: Vec<String>,
    pub image_url: String,
}

/// Extracts raw strings from catalog pages.
///
/// Missing fields are returned as empty strings / empty lists, never errors.
pub trait PageExtractor: Send + Sync {
    /// Synopsis text of a detail page.
    fn overview(&self, body: &str) -> String;

    /// Rating text on the catalog's native 0-5 scale.
    fn rating(&self, body: &str) -> String;

    /// Genre labels in page order.
    fn genres(&self, body: &str) -> Vec<String>;

    /// Absolute URL of the cover image.
    fn image_url(&self, body: &str) -> String;

    /// Display title of a detail page.
    fn title(&self, body: &str) -> String;

    /// Entry ids linked from a search result page, in page order.
    fn search_ids(&self, body: &str) -> Vec<CatalogId>;

    /// Extract every detail-page field at once.
    ///
    /// Implementations that parse the body into a DOM should override this
    /// to parse once.
    fn detail(&self, body: &str) -> DetailPage {
        DetailPage {
            title: self.title(body),
            overview: self.overview(body),
            rating: self.rating(body),
            genres: self.genres(body),
            image_url: self.image_url(body),
        }
    }
}

/// Scraper-based extractor for anisearch.com markup.
pub struct HtmlExtractor {
    title: Selector,
    og_title: Selector,
    overview_en: Selector,
    overview: Selector,
    rating: Selector,
    genres: Selector,
    og_image: Selector,
    cover: Selector,
    result_links: Selector,
    calculated_rating: Regex,
    anime_href: Regex,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::parse_failed(format!("selector {css:?}: {e}")))
}

fn regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::parse_failed(format!("regex {pattern:?}: {e}")))
}

/// Collapse all whitespace runs in an element's text to single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

impl HtmlExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: selector("h1#htitle span[itemprop=\"name\"], h1#htitle")?,
            og_title: selector("meta[property=\"og:title\"]")?,
            overview_en: selector("div.details-text[lang=\"en\"]")?,
            overview: selector("div.details-text")?,
            rating: selector("[itemprop=\"ratingValue\"]")?,
            genres: selector("ul.cloud li a")?,
            og_image: selector("meta[property=\"og:image\"]")?,
            cover: selector("img#details-cover")?,
            result_links: selector("a[href]")?,
            calculated_rating: regex(r"Calculated Value\s*</td>\s*<td[^>]*>\s*([0-9][0-9.,]*)")?,
            anime_href: regex(r"^/?anime/(\d+)")?,
        })
    }

    fn title_in(&self, doc: &Html) -> String {
        doc.select(&self.title)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .or_else(|| {
                doc.select(&self.og_title)
                    .next()
                    .and_then(|m| m.value().attr("content"))
                    .map(|t| t.trim().to_string())
            })
            .unwrap_or_default()
    }

    fn overview_in(&self, doc: &Html) -> String {
        doc.select(&self.overview_en)
            .next()
            .or_else(|| doc.select(&self.overview).next())
            .map(element_text)
            .unwrap_or_default()
    }

    fn rating_in(&self, doc: &Html, body: &str) -> String {
        if let Some(caps) = self.calculated_rating.captures(body) {
            return caps[1].to_string();
        }
        doc.select(&self.rating)
            .next()
            .map(|el| {
                el.value()
                    .attr("content")
                    .map(|c| c.trim().to_string())
                    .unwrap_or_else(|| element_text(el))
            })
            .unwrap_or_default()
    }

    fn genres_in(&self, doc: &Html) -> Vec<String> {
        doc.select(&self.genres)
            .map(element_text)
            .filter(|g| !g.is_empty())
            .collect()
    }

    fn image_url_in(&self, doc: &Html) -> String {
        doc.select(&self.og_image)
            .next()
            .and_then(|m| m.value().attr("content"))
            .or_else(|| {
                doc.select(&self.cover)
                    .next()
                    .and_then(|img| img.value().attr("src"))
            })
            .map(|u| u.trim().to_string())
            .unwrap_or_default()
    }
}

impl PageExtractor for HtmlExtractor {
    fn overview(&self, body: &str) -> String {
        self.overview_in(&Html::parse_document(body))
    }

    fn rating(&self, body: &str) -> String {
        self.rating_in(&Html::parse_document(body), body)
    }

    fn genres(&self, body: &str) -> Vec<String> {
        self.genres_in(&Html::parse_document(body))
    }

    fn image_url(&self, body: &str) -> String {
        self.image_url_in(&Html::parse_document(body))
    }

    fn title(&self, body: &str) -> String {
        self.title_in(&Html::parse_document(body))
    }

    fn search_ids(&self, body: &str) -> Vec<CatalogId> {
        let doc = Html::parse_document(body);
        let mut ids: Vec<CatalogId> = Vec::new();
        for link in doc.select(&self.result_links) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(caps) = self.anime_href.captures(href) else {
                continue;
            };
            let Ok(id) = CatalogId::parse(&caps[1]) else {
                continue;
            };
            // Result tiles link the same entry from cover and caption.
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn detail(&self, body: &str) -> DetailPage {
        let doc = Html::parse_document(body);
        DetailPage {
            title: self.title_in(&doc),
            overview: self.overview_in(&doc),
            rating: self.rating_in(&doc, body),
            genres: self.genres_in(&doc),
            image_url: self.image_url_in(&doc),
        }
    }
}
