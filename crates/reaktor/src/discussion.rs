//! Votes on documents.

use barrel_cache::{call_key, evict};
use barrel_rpc::{RpcError, Schema};
use serde_json::json;

use crate::client::Client;
use crate::document::Document;

pub struct Vote;

impl Schema for Vote {
    const INTERFACE: &'static str = "WSDiscussionMgmt";
    const NAME: &'static str = "Vote";
}

impl Vote {
    /// Post a star rating for a document.
    ///
    /// The vote changes the document's aggregates, so the cached
    /// by-id and by-isbn reads go stale; the isbn is resolved with one
    /// extra read (usually a cache hit) so both entries can be dropped.
    pub fn for_doc_id(
        client: &Client,
        token: &str,
        doc_id: &str,
        stars: i64,
    ) -> Result<(), RpcError> {
        let doc = Document::get_by_id(client, token, doc_id)?;
        // isbns are keyed as strings, matching get_by_isbn
        let isbn = doc.attributes.isbn.map(|isbn| isbn.to_string());
        let keys = [
            call_key(Document::NAME, "get_by_id", &[json!(doc_id)]),
            call_key(Document::NAME, "get_by_isbn", &[json!(isbn)]),
        ];
        Self::signature("postVoteForDocument")
            .args([json!(token), json!(doc_id), json!({"stars": stars})])
            .invoke_unit(client.transport())?;
        evict(client.cache(), &keys);
        Ok(())
    }
}
