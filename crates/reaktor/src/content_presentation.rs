//! Featured content presentations, merchandised document shelves.

use barrel_cache::{cached, call_key, sliced_args};
use barrel_core::{decode_array, Store};
use barrel_rpc::{RpcError, Schema};
use serde_json::json;
use std::time::Duration;

use crate::client::Client;
use crate::document::Document;
use crate::models::Direction;

pub struct ContentPresentation;

impl Schema for ContentPresentation {
    const INTERFACE: &'static str = "WSFeaturedContentMgmt";
    const NAME: &'static str = "ContentPresentation";
}

impl ContentPresentation {
    /// The documents of one presentation. Cache wiring present, storing
    /// disabled until presentations get invalidated on change.
    #[allow(clippy::too_many_arguments)]
    pub fn get_documents(
        client: &Client,
        token: &str,
        presentation_id: &str,
        affiliate: Option<&str>,
        offset: i64,
        number_of_results: i64,
        sort: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<Document>, RpcError> {
        let key_parts = [
            json!(token),
            json!(presentation_id),
            json!(affiliate),
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
                Self::signature("getContentPresentationDocuments")
                    .args([
                        json!(token),
                        json!(affiliate),
                        json!(presentation_id),
                        json!(offset),
                        json!(number_of_results),
                        json!(sort),
                        json!(direction.inverted()),
                    ])
                    .invoke_raw(client.transport())
            },
        )?;
        Ok(docs.unwrap_or_default())
    }
}
