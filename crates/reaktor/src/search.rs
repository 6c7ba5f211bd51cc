//! Full-text search: result pages with facet stats, suggestions, and
//! the named search source registry.

use barrel_core::{decode_array, field, Store, StoreError};
use barrel_rpc::{RpcError, Schema};
use serde_json::{json, Value};

use crate::client::Client;
use crate::document::Document;
use crate::models::Direction;

/// Named search sources and the backend source ids they stand for.
/// `free` and `local` are compound.
const AVAILABLE_SOURCES: [(&str, &[&str]); 8] = [
    (
        "commercial",
        &["com.bookpac.archive.search.sources.local.commercial"],
    ),
    (
        "community",
        &["com.bookpac.archive.search.sources.local.community"],
    ),
    (
        "free_external",
        &["com.bookpac.archive.search.sources.external.free"],
    ),
    (
        "free_local",
        &["com.bookpac.archive.search.sources.local.free"],
    ),
    ("own", &["com.bookpac.archive.search.sources.local.own"]),
    ("shop", &["com.bookpac.archive.search.sources.local.shop"]),
    (
        "free",
        &[
            "com.bookpac.archive.search.sources.local.free",
            "com.bookpac.archive.search.sources.external.free",
        ],
    ),
    (
        "local",
        &[
            "com.bookpac.archive.search.sources.local.shop",
            "com.bookpac.archive.search.sources.local.community",
            "com.bookpac.archive.search.sources.local.own",
        ],
    ),
];

/// Resolve a named source to its backend source ids.
pub fn search_sources(source: &str) -> Option<&'static [&'static str]> {
    AVAILABLE_SOURCES
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, ids)| *ids)
}

/// One search facet bucket. The backend passes the facet value as
/// `name`, so it is renamed here; the label, where provided, stays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub count: Option<i64>,
    pub value: Option<String>,
    pub label: Option<String>,
}

impl Store for Stat {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Stat {
            count: field(raw, "count").int_opt()?,
            value: field(raw, "name").string_opt()?,
            label: field(raw, "label").string_opt()?,
        })
    }
}

/// The category facet is keyed differently from every other facet;
/// this normalizes it to the same shape as [`Stat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStat {
    pub count: Option<i64>,
    pub value: Option<String>,
    pub label: Option<String>,
}

impl Store for CategoryStat {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(CategoryStat {
            count: field(raw, "count").int_opt()?,
            value: field(raw, "id").string_opt()?,
            label: field(raw, "name").string_opt()?,
        })
    }
}

/// One search hit: the document plus its relevance.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentItem {
    pub document: Document,
    pub relevance: Option<f64>,
}

impl Store for DocumentItem {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(DocumentItem {
            document: field(raw, "searchResult").embedded()?,
            relevance: field(raw, "relevance").float_opt()?,
        })
    }
}

/// Per-facet bucket lists for one result page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stats {
    pub category: Vec<CategoryStat>,
    pub collection_title: Vec<Stat>,
    pub drm: Vec<Stat>,
    pub format: Vec<Stat>,
    pub language: Vec<Stat>,
    pub price: Vec<Stat>,
    pub pub_date: Vec<Stat>,
    pub rating: Vec<Stat>,
    pub source: Vec<Stat>,
    pub tag: Vec<Stat>,
}

impl Store for Stats {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Stats {
            category: field(raw, "category").array_or_empty()?,
            collection_title: field(raw, "collectionTitle").array_or_empty()?,
            drm: field(raw, "drmType").array_or_empty()?,
            format: field(raw, "format").array_or_empty()?,
            language: field(raw, "language").array_or_empty()?,
            price: field(raw, "price").array_or_empty()?,
            pub_date: field(raw, "publication_date").array_or_empty()?,
            rating: field(raw, "rating").array_or_empty()?,
            source: field(raw, "source").array_or_empty()?,
            tag: field(raw, "tag").array_or_empty()?,
        })
    }
}

/// One result page: hits plus pagination info and facet stats.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    pub count: Option<i64>,
    pub has_less: Option<bool>,
    pub has_more: Option<bool>,
    pub items: Vec<DocumentItem>,
    pub offset: Option<i64>,
    pub stats: Stats,
    pub total_count: Option<i64>,
}

impl Store for DocumentResult {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(DocumentResult {
            count: field(raw, "numberOfResults").int_opt()?,
            has_less: field(raw, "hasLess").boolean_opt()?,
            has_more: field(raw, "hasMore").boolean_opt()?,
            items: field(raw, "results").array_or_empty()?,
            offset: field(raw, "offset").int_opt()?,
            stats: field(raw, "relatedObjects").embedded_or_default()?,
            total_count: field(raw, "totalNumberOfResults").int_opt()?,
        })
    }
}

/// Optional knobs for [`Search::documents`].
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub sort: Option<String>,
    pub direction: Direction,
    pub include_search_fields: Option<Value>,
    pub source: Option<String>,
    pub related: Option<Value>,
    pub options: Option<Value>,
}

/// The search endpoints. Not a schema over one entity; each call has
/// its own result shape.
pub struct Search;

impl Schema for Search {
    const INTERFACE: &'static str = "WSSearchDocument";
    const NAME: &'static str = "Search";
}

impl Search {
    /// Search documents for a given string.
    pub fn documents(
        client: &Client,
        token: &str,
        search_string: &str,
        offset: i64,
        number_of_results: i64,
        query: &DocumentQuery,
    ) -> Result<DocumentResult, RpcError> {
        let sources = match query.source.as_deref().and_then(search_sources) {
            Some(ids) => json!(ids),
            None => Value::Null,
        };
        let options = query
            .options
            .clone()
            .unwrap_or_else(|| json!({"resultType": "Object"}));
        Self::signature("searchDocuments")
            .args([
                json!(token),
                json!(search_string),
                sources,
                json!(offset),
                json!(number_of_results),
                json!(query.sort),
                json!(query.direction.inverted()),
                query.related.clone().unwrap_or(Value::Null),
                query.include_search_fields.clone().unwrap_or(Value::Null),
                options,
            ])
            .invoke(client.transport())
    }

    /// Suggestions are thin documents, few attributes present.
    pub fn suggestions(
        client: &Client,
        token: &str,
        search_string: &str,
        number_of_results: i64,
        sources: Option<&[&str]>,
        highlight: Option<&str>,
    ) -> Result<Vec<Document>, RpcError> {
        let sources = match sources {
            Some(ids) => json!(ids),
            None => Value::Null,
        };
        let mut signature = Self::signature(match highlight {
            Some(_) => "getSuggestionObjectsWithHighlights",
            None => "getSuggestionObjects",
        })
        .args([
            json!(token),
            json!(search_string),
            sources,
            json!(number_of_results),
        ]);
        if let Some(highlight) = highlight {
            signature = signature.arg(json!(highlight));
        }
        signature.invoke_with(client.transport(), |raw| {
            decode_array(raw, "suggestions", Document::from_raw).map_err(RpcError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_sources_expand_to_their_backend_ids() {
        assert_eq!(
            search_sources("shop"),
            Some(&["com.bookpac.archive.search.sources.local.shop"][..])
        );
        assert_eq!(search_sources("free").map(<[_]>::len), Some(2));
        assert_eq!(search_sources("local").map(<[_]>::len), Some(3));
        assert_eq!(search_sources("bogus"), None);
    }

    #[test]
    fn result_page_decodes_hits_and_facets() {
        let page = DocumentResult::from_raw(&json!({
            "numberOfResults": 2,
            "totalNumberOfResults": 40,
            "offset": 0,
            "hasMore": true,
            "hasLess": false,
            "results": [
                {"searchResult": {"documentID": "doc-1"}, "relevance": 0.91},
                {"searchResult": {"documentID": "doc-2"}, "relevance": 0.44},
            ],
            "relatedObjects": {
                "language": [{"name": "de", "count": 31}],
                "category": [{"id": "crime", "name": "Crime", "count": 9}],
            },
        }))
        .unwrap();
        assert_eq!(page.count, Some(2));
        assert_eq!(page.total_count, Some(40));
        assert_eq!(page.has_more, Some(true));
        assert_eq!(page.items[0].document.id, "doc-1");
        assert_eq!(page.items[1].relevance, Some(0.44));
        assert_eq!(page.stats.language[0].value.as_deref(), Some("de"));
        assert_eq!(page.stats.category[0].value.as_deref(), Some("crime"));
        assert_eq!(page.stats.category[0].label.as_deref(), Some("Crime"));
    }

    #[test]
    fn empty_page_decodes_with_default_stats() {
        let page = DocumentResult::from_raw(&json!({"numberOfResults": 0})).unwrap();
        assert!(page.items.is_empty());
        assert!(page.stats.language.is_empty());
    }
}
