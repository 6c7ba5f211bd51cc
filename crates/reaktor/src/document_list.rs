//! User document lists: inbox, trash, and the user's own labels.

use barrel_core::{decode_array, field, Store, StoreError};
use barrel_rpc::{RpcError, Schema, Signature};
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::client::Client;
use crate::models::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentList {
    pub id: String,
    pub count: Option<i64>,
    pub creation_date: Option<OffsetDateTime>,
    pub description: Option<String>,
    pub document_ids: Vec<String>,
    pub name: Option<String>,
    pub offset: Option<i64>,
    pub owner: Option<String>,
    pub total_count: Option<i64>,
}

impl Store for DocumentList {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(DocumentList {
            id: field(raw, "ID").string()?,
            count: field(raw, "count").int_opt()?,
            creation_date: field(raw, "creationTime").date_opt()?,
            description: field(raw, "description").string_opt()?,
            document_ids: field(raw, "documentIDs").strings_or_empty()?,
            name: field(raw, "name").string_opt()?,
            offset: field(raw, "offset").int_opt()?,
            owner: field(raw, "owner").string_opt()?,
            total_count: field(raw, "size").int_opt()?,
        })
    }
}

impl Schema for DocumentList {
    const INTERFACE: &'static str = "WSListMgmt";
    const NAME: &'static str = "DocumentList";
}

impl DocumentList {
    pub fn is_inbox(&self) -> bool {
        self.name.as_deref().map_or(false, |n| n.starts_with("INBOX-"))
    }

    pub fn is_trash(&self) -> bool {
        self.name.as_deref().map_or(false, |n| n.starts_with("TRASH-"))
    }

    pub fn delete_by_id(
        client: &Client,
        token: &str,
        list_id: &str,
        delete_documents: bool,
    ) -> Result<(), RpcError> {
        Self::signature("deleteList")
            .args([json!(token), json!(list_id), json!(delete_documents)])
            .invoke_unit(client.transport())
    }

    pub fn get_by_ids(
        client: &Client,
        token: &str,
        list_ids: &[&str],
    ) -> Result<Vec<DocumentList>, RpcError> {
        Self::signature("getLists")
            .args([json!(token), json!(list_ids)])
            .invoke_with(client.transport(), |raw| {
                decode_array(raw, "lists", DocumentList::from_raw).map_err(RpcError::from)
            })
    }

    /// Fetch one list page, re-sorted first. Bare search strings are
    /// wrapped in wildcards; strings with a field prefix (`title:...`)
    /// go through as-is.
    pub fn filter(
        client: &Client,
        token: &str,
        list_id: &str,
        search_string: Option<&str>,
        offset: i64,
        number_of_results: i64,
        sort: &str,
        direction: Direction,
    ) -> Result<DocumentList, RpcError> {
        Self::change_sorting(client, token, list_id, sort, direction)?;
        match search_string {
            Some(search) => {
                let search = if search.contains(':') {
                    search.to_string()
                } else {
                    format!("*{search}*")
                };
                Self::signature("getListConstrained")
                    .args([
                        json!(token),
                        json!(list_id),
                        json!(search),
                        json!(offset),
                        json!(number_of_results),
                    ])
                    .invoke(client.transport())
            }
            None => Self::signature("getList")
                .args([
                    json!(token),
                    json!(list_id),
                    json!(offset),
                    json!(number_of_results),
                ])
                .invoke(client.transport()),
        }
    }

    fn change_sorting(
        client: &Client,
        token: &str,
        list_id: &str,
        sort: &str,
        direction: Direction,
    ) -> Result<(), RpcError> {
        Self::signature("changeListSorting")
            .args([
                json!(token),
                json!(list_id),
                json!(sort),
                json!(direction.inverted()),
            ])
            .invoke_unit(client.transport())
    }

    /// The raw per-document list membership mapping.
    pub fn get_by_doc_ids(
        client: &Client,
        token: &str,
        document_ids: &[&str],
    ) -> Result<Value, RpcError> {
        Self::signature("getListsWithDocumentList")
            .args([json!(token), json!(document_ids)])
            .invoke_raw(client.transport())
    }

    fn get_by_type(
        client: &Client,
        token: &str,
        list_type: &str,
        offset: i64,
        number_of_results: i64,
    ) -> Result<DocumentList, RpcError> {
        Self::signature("getSpecialList")
            .args([
                json!(token),
                json!(list_type),
                json!(offset),
                json!(number_of_results),
            ])
            .invoke(client.transport())
    }

    pub fn get_inbox(
        client: &Client,
        token: &str,
        offset: i64,
        number_of_results: i64,
    ) -> Result<DocumentList, RpcError> {
        Self::get_by_type(client, token, "INBOX", offset, number_of_results)
    }

    pub fn get_trash(
        client: &Client,
        token: &str,
        offset: i64,
        number_of_results: i64,
    ) -> Result<DocumentList, RpcError> {
        Self::get_by_type(client, token, "TRASH", offset, number_of_results)
    }

    pub fn get_user_list_ids(client: &Client, token: &str) -> Result<Vec<String>, RpcError> {
        Self::signature("getListList")
            .arg(json!(token))
            .invoke_with(client.transport(), |raw| {
                decode_array(raw, "listIDs", |id| {
                    id.as_str().map(str::to_string).ok_or_else(|| {
                        StoreError::TypeMismatch {
                            target: "listIDs".to_string(),
                            expected: "string",
                            actual: id.to_string(),
                        }
                    })
                })
                .map_err(RpcError::from)
            })
    }

    /// Create a list. The backend only returns the new id, so the store
    /// is synthesized from the id plus the arguments just sent.
    pub fn create(
        client: &Client,
        token: &str,
        name: &str,
        description: &str,
    ) -> Result<DocumentList, RpcError> {
        let id = Self::signature("createList")
            .args([json!(token), json!(name), json!(description)])
            .invoke_raw(client.transport())?;
        DocumentList::from_raw(&json!({
            "ID": id,
            "name": name,
            "description": description,
        }))
        .map_err(RpcError::from)
    }

    pub fn add_documents(
        client: &Client,
        token: &str,
        list_id: &str,
        document_ids: &[&str],
        index: i64,
    ) -> Result<(), RpcError> {
        Self::signature("addDocumentsToList")
            .args([
                json!(token),
                json!(list_id),
                json!(document_ids),
                json!(index),
            ])
            .invoke_unit(client.transport())
    }

    pub fn remove_documents(
        client: &Client,
        token: &str,
        list_id: &str,
        document_ids: &[&str],
    ) -> Result<(), RpcError> {
        Self::signature("removeDocumentsFromList")
            .args([json!(token), json!(list_id), json!(document_ids)])
            .invoke_unit(client.transport())
    }

    /// Move everything in the list to trash. `keepDocumentsInOtherLists`
    /// is always true, the backend does not support false; moving a
    /// document to trash drops its other labels anyway.
    pub fn empty(client: &Client, token: &str, list_id: &str) -> Result<(), RpcError> {
        Signature::new("WSDocMgmt", "removeDocumentsInList")
            .args([json!(token), json!(list_id), json!(true)])
            .invoke_unit(client.transport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_lists_are_recognized_by_name_prefix() {
        let inbox = DocumentList::from_raw(&json!({"ID": "l-1", "name": "INBOX-u7"})).unwrap();
        assert!(inbox.is_inbox());
        assert!(!inbox.is_trash());
        let plain = DocumentList::from_raw(&json!({"ID": "l-2", "name": "favorites"})).unwrap();
        assert!(!plain.is_inbox());
        assert!(!plain.is_trash());
    }

    #[test]
    fn list_decodes_its_size_as_total_count() {
        let list = DocumentList::from_raw(&json!({
            "ID": "l-3",
            "count": 2,
            "size": 17,
            "documentIDs": ["doc-1", "doc-2"],
        }))
        .unwrap();
        assert_eq!(list.total_count, Some(17));
        assert_eq!(list.document_ids.len(), 2);
    }
}
