//! Content category schema and catalog browsing calls.

use barrel_cache::{cached, call_key, sliced_args};
use barrel_core::{decode_array, field, Store, StoreError};
use barrel_rpc::{RpcError, Schema, Signature};
use serde_json::{json, Value};
use std::time::Duration;

use crate::client::Client;
use crate::document::Document;
use crate::models::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: Option<String>,
    pub children_ids: Vec<String>,
    pub count: Option<i64>,
    pub document_ids: Vec<String>,
    pub filter: Option<String>,
    pub offset: Option<i64>,
    pub parent_id: Option<String>,
    pub total_count: Option<i64>,
}

impl Store for Category {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Category {
            id: field(raw, "ID").string()?,
            name: field(raw, "name").string_opt()?,
            children_ids: field(raw, "childrenIDs").strings_or_empty()?,
            count: field(raw, "count").int_opt()?,
            document_ids: field(raw, "documentIDs").strings_or_empty()?,
            filter: field(raw, "filter").string_opt()?,
            offset: field(raw, "offset").int_opt()?,
            parent_id: field(raw, "parentID").string_opt()?,
            total_count: field(raw, "subtreeSize").int_opt()?,
        })
    }
}

impl Schema for Category {
    const INTERFACE: &'static str = "WSContentCategoryMgmt";
    const NAME: &'static str = "Category";
}

impl Category {
    /// Fetch one category subtree. The cache wiring is in place but
    /// storing is still disabled, pending catalog invalidation on the
    /// backend side.
    #[allow(clippy::too_many_arguments)]
    pub fn get_by_id(
        client: &Client,
        token: &str,
        cat_id: &str,
        with_children: bool,
        offset: i64,
        number_of_results: i64,
        sort: Option<&str>,
        direction: Direction,
    ) -> Result<Category, RpcError> {
        let key_parts = [
            json!(token),
            json!(cat_id),
            json!(with_children),
            json!(offset),
            json!(number_of_results),
            json!(sort),
            json!(direction.inverted()),
        ];
        let key = call_key(Self::NAME, "get_by_id", sliced_args(&key_parts, 1));
        let signature = Self::signature("getContentCategory").args([
            json!(token),
            json!(cat_id),
            json!(with_children),
            json!(sort),
            json!(direction.inverted()),
            json!(offset),
            json!(number_of_results),
        ]);
        cached(
            client.cache(),
            &key,
            Duration::from_secs(3600),
            |_: Option<&Category>| false, // ready to be enabled
            |raw| Category::from_raw(raw).map_err(RpcError::from),
            || signature.invoke_raw(client.transport()),
        )?
        .ok_or_else(|| signature.missing_result())
    }

    /// The catalog roots visible to the token's nature.
    pub fn get_roots_by_token(
        client: &Client,
        token: &str,
        depth: i64,
        min_number_of_documents: i64,
    ) -> Result<Vec<Category>, RpcError> {
        Self::signature("getCatalogContentCategoryRootsForUser")
            .args([json!(token), json!(depth), json!(min_number_of_documents)])
            .invoke_with(client.transport(), |raw| {
                decode_array(raw, "categoryRoots", Category::from_raw).map_err(RpcError::from)
            })
    }

    /// The documents filed under one category, routed through the
    /// document interface. Cache wiring present, storing disabled.
    #[allow(clippy::too_many_arguments)]
    pub fn get_documents(
        client: &Client,
        token: &str,
        cat_id: &str,
        include_sub_cats: bool,
        offset: i64,
        number_of_results: i64,
        sort: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<Document>, RpcError> {
        let key_parts = [
            json!(token),
            json!(cat_id),
            json!(include_sub_cats),
            json!(offset),
            json!(number_of_results),
            json!(sort),
            json!(direction.inverted()),
        ];
        let key = call_key(Self::NAME, "get_documents", sliced_args(&key_parts, 1));
        let docs = cached(
            client.cache(),
            &key,
            Duration::from_secs(3600),
            |_: Option<&Vec<Document>>| false, // ready to be enabled
            |raw| decode_array(raw, "documents", Document::from_raw).map_err(RpcError::from),
            || {
                Signature::new("WSDocMgmt", "getDocumentsInContentCategory")
                    .args([
                        json!(token),
                        json!(cat_id),
                        json!(include_sub_cats),
                        json!(sort),
                        json!(direction.inverted()),
                        json!(offset),
                        json!(number_of_results),
                    ])
                    .invoke_raw(client.transport())
            },
        )?;
        Ok(docs.unwrap_or_default())
    }
}
