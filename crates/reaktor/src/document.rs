//! The document schema: catalog/user books, their nested attribute
//! block, and the read/mutate calls around them.

use barrel_cache::{cached, call_key, sliced_args};
use barrel_core::{decode_array, field, Store, StoreError};
use barrel_rpc::{RpcError, Schema, Signature};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use time::OffsetDateTime;

use crate::category::Category;
use crate::client::Client;
use crate::models::Price;

/// License keys that mark a document as purchasable stock.
pub const COMMERCIAL_LICENSES: [&str; 3] = [
    "commercial-retailer-default",
    "commercial-enduser-default",
    "cc-publicdomain",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Store for Author {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Author {
            first_name: field(raw, "firstName").string_opt()?,
            last_name: field(raw, "lastName").string_opt()?,
        })
    }
}

/// The flat attribute block under `attributes`. Targets are the backend's
/// snake_case attribute names, not the camelCase document keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Attributes {
    pub author: String,
    pub author_bio: String,
    pub content_provider_id: Option<String>,
    pub content_provider_name: Option<String>,
    pub content_source_id: Option<String>,
    pub cover_ratio: Option<f64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub editors_comment: Option<String>,
    pub extract: Option<String>,
    pub first_publication: Option<String>,
    pub fulfillment_id: Option<String>,
    pub fulfillment_type: Option<String>,
    pub hash: Option<String>,
    pub isbn: Option<i128>,
    pub imprint: String,
    pub language: Option<String>,
    pub large_cover_url: Option<String>,
    pub medium_cover_url: Option<String>,
    pub normal_cover_url: Option<String>,
    pub pages: Option<i64>,
    pub price: Option<Decimal>,
    pub publication_date: Option<OffsetDateTime>,
    pub publication_status: Option<String>,
    pub publisher: Option<String>,
    pub size: Option<i64>,
    pub subtitle: Option<String>,
    pub tax_group: Option<String>,
    pub title: String,
    pub undiscounted_price: Option<Decimal>,
    pub year: Option<i64>,
}

impl Store for Attributes {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Attributes {
            author: field(raw, "author").string_or("")?,
            author_bio: field(raw, "author_biography").string_or("")?,
            content_provider_id: field(raw, "content_provider_specific_id").string_opt()?,
            content_provider_name: field(raw, "content_provider_name").string_opt()?,
            content_source_id: field(raw, "content_source_id").string_opt()?,
            cover_ratio: field(raw, "cover_image_aspect_ratio").float_opt()?,
            currency: field(raw, "currency").string_opt()?,
            description: field(raw, "description").string_opt()?,
            editors_comment: field(raw, "editors_comment").string_opt()?,
            extract: field(raw, "extract").string_opt()?,
            first_publication: field(raw, "date_of_first_publication").string_opt()?,
            fulfillment_id: field(raw, "fulfillment_id").string_opt()?,
            fulfillment_type: field(raw, "fulfillment_type").string_opt()?,
            hash: field(raw, "binary_hash").string_opt()?,
            isbn: field(raw, "isbn").long_int_opt()?,
            imprint: field(raw, "imprint").string_or("")?,
            language: field(raw, "language").string_opt()?,
            large_cover_url: field(raw, "cover_image_url_large").string_opt()?,
            medium_cover_url: field(raw, "cover_image_url_medium").string_opt()?,
            normal_cover_url: field(raw, "cover_image_url_normal").string_opt()?,
            pages: field(raw, "number_of_pages").int_opt()?,
            price: field(raw, "price").decimal_opt()?,
            publication_date: field(raw, "publication_date").date_opt()?,
            publication_status: field(raw, "publication_status").string_opt()?,
            publisher: field(raw, "publisher").string_opt()?,
            size: field(raw, "size").int_opt()?,
            subtitle: field(raw, "subtitle").string_opt()?,
            tax_group: field(raw, "tax_group").string_opt()?,
            title: field(raw, "title").string_or("")?,
            undiscounted_price: field(raw, "undiscounted_price").decimal_opt()?,
            year: field(raw, "year").int_opt()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub key: Option<String>,
    pub user_roles: Vec<String>,
}

impl Store for License {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(License {
            key: field(raw, "key").string_opt()?,
            user_roles: field(raw, "currentUserRoles").strings_or_empty()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub format: Option<String>,
}

impl Store for Preview {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Preview {
            format: field(raw, "format").string_opt()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub attributes: Attributes,
    pub authors: Vec<Author>,
    pub catalog_state: Option<String>,
    categories: Vec<Category>,
    pub category_ids: Vec<String>,
    pub creation_date: Option<OffsetDateTime>,
    pub creator: Option<String>,
    pub drm_type: Option<String>,
    pub file_name: String,
    pub format: String,
    pub has_thumbnail: Option<bool>,
    pub in_public_list: Option<bool>,
    pub lang_code: Option<String>,
    pub licenses: Vec<License>,
    pub master_id: Option<String>,
    pub modification_date: Option<OffsetDateTime>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub previews: Vec<Preview>,
    pub doc_type: Option<String>,
    pub user_state: String,
    pub user_tags: Vec<String>,
    pub version: Option<i64>,
    pub version_access_type: Option<String>,
    pub version_size: Option<i64>,
    pub votes: Option<i64>,
    pub cumulative_votes: i64,
    pub personal_votes: i64,
}

impl Store for Document {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Document {
            id: field(raw, "documentID").string()?,
            attributes: field(raw, "attributes").embedded_or_default()?,
            authors: field(raw, "authors").array_or_empty()?,
            catalog_state: field(raw, "catalogDocumentState").string_opt()?,
            categories: field(raw, "contentCategories").array_or_empty()?,
            category_ids: field(raw, "contentCategoryIDs").strings_or_empty()?,
            creation_date: field(raw, "creationTime").date_opt()?,
            creator: field(raw, "creator").string_opt()?,
            drm_type: field(raw, "drmType").string_opt()?,
            file_name: field(raw, "fileName").string_or("")?,
            format: field(raw, "format").string_or("")?,
            has_thumbnail: field(raw, "hasThumbnail").boolean_opt()?,
            in_public_list: field(raw, "inPublicList").boolean_opt()?,
            lang_code: field(raw, "languageCode").string_opt()?,
            licenses: field(raw, "licenses").array_or_empty()?,
            master_id: field(raw, "documentMasterID").string_opt()?,
            modification_date: field(raw, "modificationTime").date_opt()?,
            name: field(raw, "displayName").string_opt()?,
            owner: field(raw, "owner").string_opt()?,
            previews: field(raw, "documentPreviews").array_or_empty()?,
            doc_type: field(raw, "type").string_opt()?,
            user_state: field(raw, "userDocumentState").string_or("?")?,
            user_tags: field(raw, "userTags").strings_or_empty()?,
            version: field(raw, "version").int_opt()?,
            version_access_type: field(raw, "versionAccessType").string_opt()?,
            version_size: field(raw, "versionSize").int_opt()?,
            votes: field(raw, "numberOfVotes").int_opt()?,
            cumulative_votes: field(raw, "cumulativeVotes:stars").int_or(0)?,
            personal_votes: field(raw, "personalVotes:stars").int_or(0)?,
        })
    }
}

impl Schema for Document {
    const INTERFACE: &'static str = "WSDocMgmt";
    const NAME: &'static str = "Document";
}

// ── Derived properties ──────────────────────────────────────────────

impl Document {
    /// The display price, if the attribute block carries one.
    pub fn price(&self) -> Option<Price> {
        Some(Price {
            amount: self.attributes.price?,
            currency: self.attributes.currency.clone()?,
        })
    }

    pub fn undiscounted_price(&self) -> Option<Price> {
        Some(Price {
            amount: self.attributes.undiscounted_price?,
            currency: self.attributes.currency.clone()?,
        })
    }

    pub fn is_preorder(&self) -> bool {
        !self.is_user() && self.catalog_state.as_deref() == Some("PRE_RELEASE")
    }

    pub fn is_fulfilled(&self) -> bool {
        self.user_state == "FULFILLED" || self.is_upload()
    }

    pub fn is_user(&self) -> bool {
        self.doc_type.as_deref() == Some("USER")
    }

    pub fn is_upload(&self) -> bool {
        self.user_state == "UPLOADED_BY_USER"
    }

    pub fn is_commercial(&self) -> bool {
        self.licenses
            .iter()
            .filter_map(|l| l.key.as_deref())
            .any(|key| COMMERCIAL_LICENSES.contains(&key))
    }

    pub fn has_drm(&self) -> bool {
        self.version_access_type.as_deref() == Some("ADEPT_DRM")
    }

    /// The category trail in tree order, oldest ancestor first.
    ///
    /// Built from `contentCategoryIDs` plus the flat `contentCategories`
    /// array; the backend omits both when the document is viewed from a
    /// catalog outside the token's nature, which yields an empty trail.
    /// Each category is consumed at most once, so a malformed parent
    /// chain terminates instead of looping.
    pub fn category_trail(&self) -> Vec<&Category> {
        let Some(leaf_id) = self.category_ids.first() else {
            return Vec::new();
        };
        let mut by_id: HashMap<&str, &Category> = self
            .categories
            .iter()
            .map(|cat| (cat.id.as_str(), cat))
            .collect();
        let Some(mut current) = by_id.remove(leaf_id.as_str()) else {
            return Vec::new();
        };
        let mut trail = vec![current];
        while let Some(parent_id) = current.parent_id.as_deref() {
            match by_id.remove(parent_id) {
                Some(parent) => {
                    trail.insert(0, parent);
                    current = parent;
                }
                None => break,
            }
        }
        trail
    }
}

// ── Operations ──────────────────────────────────────────────────────

impl Document {
    /// Fetch one document by catalog or user document id.
    ///
    /// Cached for an hour, keyed by the id. A `null` result is cached
    /// too: a document can surface in search while its id lookup still
    /// misses on an outdated backend index, and pinning the miss avoids
    /// re-issuing the call each time. Freshly uploaded user documents
    /// are the one thing not stored, their state flips right after.
    pub fn get_by_id(client: &Client, token: &str, doc_id: &str) -> Result<Document, RpcError> {
        let key = call_key(Self::NAME, "get_by_id", &[json!(doc_id)]);
        let signature = Self::signature("getDocument").args([json!(token), json!(doc_id)]);
        cached(
            client.cache(),
            &key,
            Duration::from_secs(3600),
            |doc: Option<&Document>| doc.map_or(true, |d| !d.is_upload()),
            |raw| Document::from_raw(raw).map_err(RpcError::from),
            || signature.invoke_raw(client.transport()),
        )?
        .ok_or_else(|| signature.missing_result())
    }

    pub fn get_by_ids(
        client: &Client,
        token: &str,
        doc_ids: &[&str],
    ) -> Result<Vec<Document>, RpcError> {
        Self::signature("getDocuments")
            .args([json!(token), json!(doc_ids)])
            .invoke_with(client.transport(), |raw| {
                decode_array(raw, "documents", Document::from_raw).map_err(RpcError::from)
            })
    }

    /// The user document id paired to a catalog document id, if any.
    pub fn get_user_doc_id(
        client: &Client,
        token: &str,
        doc_id: &str,
    ) -> Result<Option<String>, RpcError> {
        Self::signature("getUserDocumentID")
            .args([json!(token), json!(doc_id)])
            .invoke_with(client.transport(), |raw| {
                Ok(raw.as_str().map(str::to_string))
            })
    }

    /// The path to the unzipped epub, user copy or catalog preview.
    pub fn get_doc_path(
        client: &Client,
        token: &str,
        doc_id: &str,
        is_user: bool,
    ) -> Result<Option<String>, RpcError> {
        let method = if is_user {
            "unzipEpubUserDocument"
        } else {
            "unzipEpubPreview"
        };
        Self::signature(method)
            .args([json!(token), json!(doc_id)])
            .invoke_with(client.transport(), |raw| {
                Ok(raw.as_str().map(str::to_string))
            })
    }

    /// Fetch one document by isbn through the search endpoint, since a
    /// direct lookup by isbn needs extra backend rights. Cached for an
    /// hour, keyed by the isbn; only the matched search result fragment
    /// is kept, not the whole result page.
    ///
    /// The isbn enters the key material rendered as a string: a long-int
    /// can exceed what a JSON number holds.
    pub fn get_by_isbn(client: &Client, token: &str, isbn: i128) -> Result<Document, RpcError> {
        let key = call_key(Self::NAME, "get_by_isbn", &[json!(isbn.to_string())]);
        let signature = Signature::new("WSSearchDocument", "searchDocuments").args([
            json!(token),
            json!(format!("isbn:{isbn}")),
            Value::Null,
            json!(0),
            json!(1),
            Value::Null,
            json!(false),
            Value::Null,
            Value::Null,
            json!({"resultType": "Object"}),
        ]);
        cached(
            client.cache(),
            &key,
            Duration::from_secs(3600),
            |_: Option<&Document>| true,
            |raw| Document::from_raw(raw).map_err(RpcError::from),
            || {
                let page = signature.invoke_raw(client.transport())?;
                Ok(page
                    .pointer("/results/0/searchResult")
                    .cloned()
                    .unwrap_or(Value::Null))
            },
        )?
        .ok_or_else(|| signature.missing_result())
    }

    /// Documents related to the given id, cached for an hour.
    pub fn get_related_by_id(
        client: &Client,
        token: &str,
        doc_id: &str,
        offset: i64,
        number_of_results: i64,
    ) -> Result<Vec<Document>, RpcError> {
        let key_parts = [
            json!(token),
            json!(doc_id),
            json!(offset),
            json!(number_of_results),
        ];
        let key = call_key(Self::NAME, "get_related_by_id", sliced_args(&key_parts, 1));
        let related = cached(
            client.cache(),
            &key,
            Duration::from_secs(3600),
            |_: Option<&Vec<Document>>| true,
            |raw| decode_array(raw, "related", Document::from_raw).map_err(RpcError::from),
            || {
                Self::signature("getDocumentsRelatedToDocument")
                    .args([
                        json!(token),
                        json!(doc_id),
                        json!(offset),
                        json!(number_of_results),
                    ])
                    .invoke_raw(client.transport())
            },
        )?;
        Ok(related.unwrap_or_default())
    }

    pub fn change_attributes(
        client: &Client,
        token: &str,
        doc_ids: &[&str],
        attributes: Value,
    ) -> Result<(), RpcError> {
        Self::signature("changeDocumentAttributes")
            .args([json!(token), json!(doc_ids), attributes])
            .invoke_unit(client.transport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Value {
        json!({
            "documentID": "doc-42",
            "attributes": {
                "author": "B. Traven",
                "title": "The Death Ship",
                "isbn": 9783257201550u64,
                "price": 9.99,
                "undiscounted_price": 12.99,
                "currency": "EUR",
                "number_of_pages": 288,
                "year": 1926,
                "publication_date": "1926-04-01T00:00:00Z",
            },
            "authors": [
                {"firstName": "B.", "lastName": "Traven"},
            ],
            "catalogDocumentState": "RELEASED",
            "contentCategoryIDs": ["noir"],
            "contentCategories": [
                {"ID": "fiction", "name": "Fiction"},
                {"ID": "crime", "name": "Crime", "parentID": "fiction"},
                {"ID": "noir", "name": "Noir", "parentID": "crime"},
            ],
            "licenses": [
                {"key": "commercial-retailer-default", "currentUserRoles": ["BUYER"]},
            ],
            "type": "CATALOG",
            "versionAccessType": "ADEPT_DRM",
            "cumulativeVotes": {"stars": 37},
        })
    }

    #[test]
    fn decodes_the_nested_attribute_block() {
        let doc = Document::from_raw(&fixture()).unwrap();
        assert_eq!(doc.id, "doc-42");
        assert_eq!(doc.attributes.title, "The Death Ship");
        assert_eq!(doc.attributes.isbn, Some(9783257201550));
        assert_eq!(doc.attributes.pages, Some(288));
        assert_eq!(doc.authors[0].last_name.as_deref(), Some("Traven"));
        assert_eq!(doc.cumulative_votes, 37);
        assert_eq!(doc.personal_votes, 0);
        assert_eq!(doc.user_state, "?");
        assert!(doc.user_tags.is_empty());
    }

    #[test]
    fn price_pairs_amount_with_currency() {
        let doc = Document::from_raw(&fixture()).unwrap();
        let price = doc.price().unwrap();
        assert_eq!(price.amount, "9.99".parse().unwrap());
        assert_eq!(price.currency, "EUR");
        assert_eq!(
            doc.undiscounted_price().unwrap().amount,
            "12.99".parse().unwrap()
        );
    }

    #[test]
    fn price_needs_both_halves() {
        let mut raw = fixture();
        raw["attributes"]
            .as_object_mut()
            .unwrap()
            .remove("currency");
        let doc = Document::from_raw(&raw).unwrap();
        assert_eq!(doc.price(), None);
    }

    #[test]
    fn trail_runs_oldest_ancestor_to_leaf() {
        let doc = Document::from_raw(&fixture()).unwrap();
        let trail: Vec<&str> = doc
            .category_trail()
            .iter()
            .map(|cat| cat.id.as_str())
            .collect();
        assert_eq!(trail, vec!["fiction", "crime", "noir"]);
    }

    #[test]
    fn trail_is_empty_without_category_info() {
        let mut raw = fixture();
        raw.as_object_mut().unwrap().remove("contentCategoryIDs");
        let doc = Document::from_raw(&raw).unwrap();
        assert!(doc.category_trail().is_empty());
    }

    #[test]
    fn trail_stops_at_a_missing_ancestor() {
        let mut raw = fixture();
        raw["contentCategories"] = json!([
            {"ID": "noir", "name": "Noir", "parentID": "crime"},
        ]);
        let doc = Document::from_raw(&raw).unwrap();
        let trail: Vec<&str> = doc
            .category_trail()
            .iter()
            .map(|cat| cat.id.as_str())
            .collect();
        assert_eq!(trail, vec!["noir"]);
    }

    #[test]
    fn commercial_and_drm_flags() {
        let doc = Document::from_raw(&fixture()).unwrap();
        assert!(doc.is_commercial());
        assert!(doc.has_drm());
        assert!(!doc.is_user());
        assert!(!doc.is_preorder());
        assert!(!doc.is_fulfilled());
    }

    #[test]
    fn preorder_needs_a_catalog_document() {
        let mut raw = fixture();
        raw["catalogDocumentState"] = json!("PRE_RELEASE");
        let doc = Document::from_raw(&raw).unwrap();
        assert!(doc.is_preorder());

        raw["type"] = json!("USER");
        let doc = Document::from_raw(&raw).unwrap();
        assert!(!doc.is_preorder());
    }

    #[test]
    fn upload_counts_as_fulfilled() {
        let mut raw = fixture();
        raw["userDocumentState"] = json!("UPLOADED_BY_USER");
        let doc = Document::from_raw(&raw).unwrap();
        assert!(doc.is_upload());
        assert!(doc.is_fulfilled());
    }
}
