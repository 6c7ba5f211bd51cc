//! Wishlists and preorder lists: dated document entries plus the add
//! and remove calls around them.

use barrel_core::{field, Store, StoreError};
use barrel_rpc::{RpcError, Schema};
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::client::Client;
use crate::document::Document;

/// One list entry: the document plus when it was put on the list.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListItem {
    pub document: Document,
    pub creation_date: Option<OffsetDateTime>,
}

impl Store for ShoppingListItem {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(ShoppingListItem {
            document: field(raw, "document").embedded()?,
            creation_date: field(raw, "creationDate").date_opt()?,
        })
    }
}

pub struct WishlistItem;

impl Schema for WishlistItem {
    const INTERFACE: &'static str = "WSShopMgmt";
    const NAME: &'static str = "WishlistItem";
}

impl WishlistItem {
    pub fn add_to_list(client: &Client, token: &str, doc_id: &str) -> Result<(), RpcError> {
        Self::signature("addDocumentToCommercialWishList")
            .args([json!(token), json!(doc_id)])
            .invoke_unit(client.transport())
    }

    pub fn remove_from_list(client: &Client, token: &str, doc_id: &str) -> Result<(), RpcError> {
        Self::signature("removeDocumentFromCommercialWishList")
            .args([json!(token), json!(doc_id)])
            .invoke_unit(client.transport())
    }
}

/// Preorder entries are created by buying an unreleased document, so
/// there is deliberately no add call here; removal is the only direct
/// list mutation.
pub struct PreorderlistItem;

impl Schema for PreorderlistItem {
    const INTERFACE: &'static str = "WSShopMgmt";
    const NAME: &'static str = "PreorderlistItem";
}

impl PreorderlistItem {
    pub fn remove_from_list(client: &Client, token: &str, doc_id: &str) -> Result<(), RpcError> {
        Self::signature("removeDocumentFromPreOrderList")
            .args([json!(token), json!(doc_id)])
            .invoke_unit(client.transport())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wishlist {
    pub items: Vec<ShoppingListItem>,
}

impl Store for Wishlist {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Wishlist {
            items: field(raw, "entries").array_or_empty()?,
        })
    }
}

impl Schema for Wishlist {
    const INTERFACE: &'static str = "WSShopMgmt";
    const NAME: &'static str = "Wishlist";
}

impl Wishlist {
    pub fn get_by_token(client: &Client, token: &str) -> Result<Wishlist, RpcError> {
        Self::signature("getCommercialWishList")
            .arg(json!(token))
            .invoke(client.transport())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preorderlist {
    pub items: Vec<ShoppingListItem>,
}

impl Store for Preorderlist {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Preorderlist {
            items: field(raw, "entries").array_or_empty()?,
        })
    }
}

impl Schema for Preorderlist {
    const INTERFACE: &'static str = "WSShopMgmt";
    const NAME: &'static str = "Preorderlist";
}

impl Preorderlist {
    pub fn get_by_token(client: &Client, token: &str) -> Result<Preorderlist, RpcError> {
        Self::signature("getPreOrderList")
            .arg(json!(token))
            .invoke(client.transport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_their_creation_dates() {
        let list = Wishlist::from_raw(&json!({
            "entries": [
                {
                    "document": {"documentID": "doc-1"},
                    "creationDate": "2026-02-03T10:00:00Z",
                },
                {"document": {"documentID": "doc-2"}},
            ],
        }))
        .unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].document.id, "doc-1");
        assert!(list.items[0].creation_date.is_some());
        assert!(list.items[1].creation_date.is_none());
    }

    #[test]
    fn missing_entries_decode_as_an_empty_list() {
        let list = Preorderlist::from_raw(&json!({})).unwrap();
        assert!(list.items.is_empty());
    }
}
