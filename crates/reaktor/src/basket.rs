//! Shop baskets: polymorphic positions, applied vouchers, totals, and
//! the checkout flow.

use barrel_core::{field, Store, StoreError, VariantRegistry};
use barrel_rpc::{RpcError, Schema};
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use time::OffsetDateTime;

use crate::client::Client;
use crate::document::Document;
use crate::models::Price;
use crate::voucher::Voucher;

// txtr to adyen mapping of payment methods; the backend groups the
// adyen names under the two com.bookpac PaymentMethod enum values.
pub const CREDITCARD_METHODS: [&str; 2] = ["visa", "mc"];
pub const ELV_METHODS: [&str; 1] = ["elv"];

/// The per-position and per-basket total block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Totals {
    pub total: Option<Price>,
    pub net_total: Option<Price>,
    pub tax_total: Option<Price>,
    pub undiscounted_total: Option<Price>,
}

impl Totals {
    fn for_position(raw: &Value) -> Result<Self, StoreError> {
        Ok(Totals {
            total: field(raw, "positionTotal").embedded_opt()?,
            net_total: field(raw, "positionNetTotal").embedded_opt()?,
            tax_total: field(raw, "positionTaxTotal").embedded_opt()?,
            undiscounted_total: field(raw, "undiscountedPositionTotal").embedded_opt()?,
        })
    }

    fn for_basket(raw: &Value) -> Result<Self, StoreError> {
        Ok(Totals {
            total: field(raw, "total").embedded_opt()?,
            net_total: field(raw, "netTotal").embedded_opt()?,
            tax_total: field(raw, "taxTotal").embedded_opt()?,
            undiscounted_total: field(raw, "undiscountedTotal").embedded_opt()?,
        })
    }
}

// ── Positions ───────────────────────────────────────────────────────

/// A `BasketPosition` holding a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentItem {
    pub document: Document,
    pub totals: Totals,
}

impl Store for DocumentItem {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(DocumentItem {
            document: field(raw, "item").embedded()?,
            totals: Totals::for_position(raw)?,
        })
    }
}

impl Schema for DocumentItem {
    const INTERFACE: &'static str = "WSDocMgmt";
    const NAME: &'static str = "DocumentItem";
}

impl DocumentItem {
    /// Set how many copies of the document the basket holds; zero
    /// removes the position.
    pub fn set_basket_quantity(
        client: &Client,
        token: &str,
        basket_id: &str,
        doc_id: &str,
        quantity: i64,
    ) -> Result<(), RpcError> {
        Self::signature("changeDocumentBasketPosition")
            .args([json!(token), json!(basket_id), json!(doc_id), json!(quantity)])
            .invoke_unit(client.transport())
    }

    pub fn add_to_basket(
        client: &Client,
        token: &str,
        basket_id: &str,
        doc_id: &str,
    ) -> Result<(), RpcError> {
        Self::set_basket_quantity(client, token, basket_id, doc_id, 1)
    }

    pub fn remove_from_basket(
        client: &Client,
        token: &str,
        basket_id: &str,
        doc_id: &str,
    ) -> Result<(), RpcError> {
        Self::set_basket_quantity(client, token, basket_id, doc_id, 0)
    }
}

/// A `BasketPosition` holding a voucher, named gift card following the
/// txtr convention to keep it apart from applied vouchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftCardItem {
    pub giftcard: Voucher,
    pub totals: Totals,
}

impl Store for GiftCardItem {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(GiftCardItem {
            giftcard: field(raw, "item").embedded()?,
            totals: Totals::for_position(raw)?,
        })
    }
}

/// One basket position, dispatched on the backend's `itemType` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum BasketItem {
    Document(DocumentItem),
    GiftCard(GiftCardItem),
}

fn item_variants() -> &'static VariantRegistry<BasketItem> {
    static VARIANTS: OnceLock<VariantRegistry<BasketItem>> = OnceLock::new();
    VARIANTS.get_or_init(|| {
        VariantRegistry::new("itemType")
            .with("DOCUMENT", |raw| {
                DocumentItem::from_raw(raw).map(BasketItem::Document)
            })
            .with("VOUCHER", |raw| {
                GiftCardItem::from_raw(raw).map(BasketItem::GiftCard)
            })
    })
}

impl Store for BasketItem {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        item_variants().decode(raw)
    }
}

impl BasketItem {
    pub fn document(&self) -> Option<&Document> {
        match self {
            BasketItem::Document(item) => Some(&item.document),
            BasketItem::GiftCard(_) => None,
        }
    }

    pub fn giftcard(&self) -> Option<&Voucher> {
        match self {
            BasketItem::GiftCard(item) => Some(&item.giftcard),
            BasketItem::Document(_) => None,
        }
    }

    pub fn totals(&self) -> &Totals {
        match self {
            BasketItem::Document(item) => &item.totals,
            BasketItem::GiftCard(item) => &item.totals,
        }
    }
}

// ── Applied vouchers ────────────────────────────────────────────────

/// A `VoucherApplication`: a voucher applied to the basket plus the
/// discount it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherItem {
    pub voucher: Option<Voucher>,
    pub discount: Option<Price>,
}

impl Store for VoucherItem {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(VoucherItem {
            voucher: field(raw, "voucher").embedded_opt()?,
            discount: field(raw, "discountAmount").embedded_opt()?,
        })
    }
}

impl Schema for VoucherItem {
    const INTERFACE: &'static str = "WSVoucherMgmt";
    const NAME: &'static str = "VoucherItem";
}

/// The `BasketModificationResult` coming back from the voucher calls:
/// a result code plus the re-priced basket.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketModification {
    pub code: Option<String>,
    pub basket: Option<Box<Basket>>,
}

impl Store for BasketModification {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(BasketModification {
            code: field(raw, "resultCode").string_opt()?,
            basket: field(raw, "basket").embedded_opt::<Basket>()?.map(Box::new),
        })
    }
}

impl VoucherItem {
    pub fn apply(
        client: &Client,
        token: &str,
        code: &str,
        basket_id: &str,
    ) -> Result<BasketModification, RpcError> {
        Self::signature("addVoucherToBasket")
            .args([json!(token), json!(code), json!(basket_id)])
            .invoke(client.transport())
    }

    pub fn remove(
        client: &Client,
        token: &str,
        code: &str,
        basket_id: &str,
    ) -> Result<BasketModification, RpcError> {
        Self::signature("removeVoucherFromBasket")
            .args([json!(token), json!(code), json!(basket_id)])
            .invoke(client.transport())
    }

    pub fn assign(
        client: &Client,
        token: &str,
        code: &str,
    ) -> Result<BasketModification, RpcError> {
        Self::signature("assignVoucherToUserAccount")
            .args([json!(token), json!(code)])
            .invoke(client.transport())
    }
}

// ── Checkout ────────────────────────────────────────────────────────

/// The flags and identifiers the asynchronous checkout call takes.
#[derive(Debug, Clone, Default)]
pub struct CheckoutProperties {
    pub clear_failed_preauth: bool,
    pub clear_preauth: bool,
    pub use_preauth: bool,
    pub recurring_payment: bool,
    pub affiliate_id: Option<String>,
    pub external_transaction_id: Option<String>,
}

impl CheckoutProperties {
    /// The wire mapping the backend expects; absent identifiers are
    /// left out rather than sent as null.
    pub fn to_raw(&self) -> Value {
        let mut props = Map::new();
        props.insert(
            "clearFailedAuthorization".to_string(),
            json!(self.clear_failed_preauth),
        );
        props.insert("clearPreAuthorization".to_string(), json!(self.clear_preauth));
        props.insert("usePreAuthorization".to_string(), json!(self.use_preauth));
        props.insert(
            "requestedRecurringPayment".to_string(),
            json!(self.recurring_payment),
        );
        if let Some(id) = &self.affiliate_id {
            props.insert("affiliateID".to_string(), json!(id));
        }
        if let Some(id) = &self.external_transaction_id {
            props.insert("externalTransactionID".to_string(), json!(id));
        }
        Value::Object(props)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutResult {
    pub basket: Option<Basket>,
    pub code: Option<String>,
    pub receipt_id: Option<String>,
    pub transaction_id: Option<String>,
}

impl Store for CheckoutResult {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(CheckoutResult {
            basket: field(raw, "basket").embedded_opt()?,
            code: field(raw, "resultCode").string_opt()?,
            receipt_id: field(raw, "receiptIdentifier").string_opt()?,
            transaction_id: field(raw, "transactionID").string_opt()?,
        })
    }
}

// ── Basket ──────────────────────────────────────────────────────────

/// The payment form descriptors keyed by their literal com.bookpac
/// setting names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentForm {
    pub form: Option<String>,
    pub recurring: Option<String>,
    pub worecurring: Option<String>,
}

impl Store for PaymentForm {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(PaymentForm {
            form: field(raw, "com.bookpac.server.shop.payment.paymentform").string_opt()?,
            recurring: field(raw, "com.bookpac.server.shop.payment.paymentform.recurring")
                .string_opt()?,
            worecurring: field(raw, "com.bookpac.server.shop.payment.paymentform.worecurring")
                .string_opt()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Basket {
    pub id: String,
    pub checked_out: Option<bool>,
    pub creation_date: Option<OffsetDateTime>,
    pub modification_date: Option<OffsetDateTime>,
    pub country: Option<String>,
    pub totals: Totals,
    pub payment_forms: Option<PaymentForm>,
    pub items: Vec<BasketItem>,
    pub authorized_payment_methods: Vec<String>,
    pub vouchers: Vec<VoucherItem>,
}

impl Store for Basket {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Basket {
            id: field(raw, "ID").string()?,
            checked_out: field(raw, "checkedOut").boolean_opt()?,
            creation_date: field(raw, "creationTime").date_opt()?,
            modification_date: field(raw, "modificationTime").date_opt()?,
            country: field(raw, "country").string_opt()?,
            totals: Totals::for_basket(raw)?,
            payment_forms: field(raw, "paymentForms").embedded_opt()?,
            items: field(raw, "positions").array_or_empty()?,
            authorized_payment_methods: field(raw, "authorizedPaymentMethods")
                .strings_or_empty()?,
            vouchers: field(raw, "voucherApplications").array_or_empty()?,
        })
    }
}

impl Schema for Basket {
    const INTERFACE: &'static str = "WSShopMgmt";
    const NAME: &'static str = "Basket";
}

impl Basket {
    pub fn document_items(&self) -> impl Iterator<Item = &DocumentItem> {
        self.items.iter().filter_map(|item| match item {
            BasketItem::Document(item) => Some(item),
            BasketItem::GiftCard(_) => None,
        })
    }

    pub fn giftcard_items(&self) -> impl Iterator<Item = &GiftCardItem> {
        self.items.iter().filter_map(|item| match item {
            BasketItem::GiftCard(item) => Some(item),
            BasketItem::Document(_) => None,
        })
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.document_items().map(|item| &item.document)
    }

    pub fn giftcards(&self) -> impl Iterator<Item = &Voucher> {
        self.giftcard_items().map(|item| &item.giftcard)
    }

    /// At least one document in the basket is regular stock.
    pub fn is_regular(&self) -> bool {
        self.documents().any(|doc| !doc.is_preorder())
    }

    /// At least one document in the basket is a preorder.
    pub fn is_preorder(&self) -> bool {
        self.documents().any(|doc| doc.is_preorder())
    }

    /// Whether the basket is pre-authorized for the given adyen payment
    /// method name.
    pub fn is_authorized_for(&self, payment_method: &str) -> bool {
        let group = if CREDITCARD_METHODS.contains(&payment_method) {
            "CREDITCARD"
        } else if ELV_METHODS.contains(&payment_method) {
            "ELV"
        } else {
            return false;
        };
        self.authorized_payment_methods.iter().any(|m| m == group)
    }

    pub fn get_by_id(
        client: &Client,
        token: &str,
        basket_id: Option<&str>,
    ) -> Result<Basket, RpcError> {
        Self::signature("getBasket")
            .args([json!(token), json!(basket_id)])
            .invoke(client.transport())
    }

    /// The account's own basket.
    pub fn get_by_token(client: &Client, token: &str) -> Result<Basket, RpcError> {
        Self::get_by_id(client, token, None)
    }

    pub fn get_free(client: &Client, token: &str, marker: Option<&str>) -> Result<Basket, RpcError> {
        Self::signature("getFreeBasket")
            .args([json!(token), json!(marker)])
            .invoke(client.transport())
    }

    pub fn get_preview(
        client: &Client,
        token: &str,
        marker: Option<&str>,
    ) -> Result<Basket, RpcError> {
        Self::signature("getNewPreviewBasket")
            .args([json!(token), json!(marker)])
            .invoke(client.transport())
    }

    pub fn get_validation(client: &Client, token: &str, marker: &str) -> Result<Basket, RpcError> {
        Self::signature("getValidationBasket")
            .args([json!(token), json!(marker)])
            .invoke(client.transport())
    }

    pub fn create(client: &Client, token: &str, marker: Option<&str>) -> Result<Basket, RpcError> {
        Self::signature("getNewBasket")
            .args([json!(token), json!(marker)])
            .invoke(client.transport())
    }

    pub fn clear(client: &Client, token: &str, basket_id: &str) -> Result<(), RpcError> {
        Self::signature("removeAllBasketPositions")
            .args([json!(token), json!(basket_id)])
            .invoke_unit(client.transport())
    }

    pub fn checkout(
        client: &Client,
        token: &str,
        basket_id: &str,
        props: &CheckoutProperties,
    ) -> Result<CheckoutResult, RpcError> {
        Self::signature("checkoutBasketAsynchronously")
            .args([json!(token), json!(basket_id), props.to_raw()])
            .invoke(client.transport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Value {
        json!({
            "ID": "basket-9",
            "checkedOut": false,
            "country": "DE",
            "total": {"amount": 22.49, "currency": "EUR"},
            "undiscountedTotal": {"amount": 24.99, "currency": "EUR"},
            "authorizedPaymentMethods": ["CREDITCARD"],
            "positions": [
                {
                    "itemType": "DOCUMENT",
                    "item": {"documentID": "doc-1", "catalogDocumentState": "RELEASED"},
                    "positionTotal": {"amount": 12.49, "currency": "EUR"},
                },
                {
                    "itemType": "VOUCHER",
                    "item": {"code": "GIFT-25", "javaClass": "WSTAmountVoucher"},
                    "positionTotal": {"amount": 10, "currency": "EUR"},
                },
            ],
            "voucherApplications": [
                {
                    "voucher": {"code": "TEN-OFF", "percentage": 10},
                    "discountAmount": {"amount": 2.5, "currency": "EUR"},
                },
            ],
        })
    }

    #[test]
    fn positions_dispatch_on_item_type() {
        let basket = Basket::from_raw(&fixture()).unwrap();
        assert_eq!(basket.items.len(), 2);
        assert_eq!(basket.items[0].document().unwrap().id, "doc-1");
        assert_eq!(
            basket.items[1].giftcard().unwrap().code.as_deref(),
            Some("GIFT-25")
        );
        assert_eq!(basket.documents().count(), 1);
        assert_eq!(basket.giftcards().count(), 1);
    }

    #[test]
    fn unknown_item_type_is_unsupported() {
        let err = BasketItem::from_raw(&json!({"itemType": "BOGUS"})).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVariant { ref tag, .. } if tag == "BOGUS"
        ));
    }

    #[test]
    fn untagged_item_is_unsupported_as_none() {
        let err = BasketItem::from_raw(&json!({"item": {}})).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVariant { ref tag, .. } if tag == "NONE"
        ));
    }

    #[test]
    fn totals_read_the_basket_level_targets() {
        let basket = Basket::from_raw(&fixture()).unwrap();
        let total = basket.totals.total.as_ref().unwrap();
        assert_eq!(total.amount, "22.49".parse().unwrap());
        assert_eq!(basket.totals.net_total, None);
        let position = basket.items[0].totals();
        assert_eq!(
            position.total.as_ref().unwrap().amount,
            "12.49".parse().unwrap()
        );
    }

    #[test]
    fn voucher_applications_decode_alongside_positions() {
        let basket = Basket::from_raw(&fixture()).unwrap();
        assert_eq!(basket.vouchers.len(), 1);
        let applied = &basket.vouchers[0];
        assert_eq!(applied.voucher.as_ref().unwrap().percentage, Some(10));
        assert_eq!(
            applied.discount.as_ref().unwrap().amount,
            "2.5".parse().unwrap()
        );
    }

    #[test]
    fn authorization_maps_adyen_names_to_method_groups() {
        let basket = Basket::from_raw(&fixture()).unwrap();
        assert!(basket.is_authorized_for("visa"));
        assert!(basket.is_authorized_for("mc"));
        assert!(!basket.is_authorized_for("elv"));
        assert!(!basket.is_authorized_for("paypal"));
    }

    #[test]
    fn regular_and_preorder_look_at_documents_only() {
        let basket = Basket::from_raw(&fixture()).unwrap();
        assert!(basket.is_regular());
        assert!(!basket.is_preorder());

        let mut raw = fixture();
        raw["positions"][0]["item"]["catalogDocumentState"] = json!("PRE_RELEASE");
        let basket = Basket::from_raw(&raw).unwrap();
        assert!(!basket.is_regular());
        assert!(basket.is_preorder());
    }

    #[test]
    fn modification_result_embeds_the_repriced_basket() {
        let result = BasketModification::from_raw(&json!({
            "resultCode": "OK",
            "basket": fixture(),
        }))
        .unwrap();
        assert_eq!(result.code.as_deref(), Some("OK"));
        assert_eq!(result.basket.unwrap().id, "basket-9");
    }

    #[test]
    fn checkout_properties_omit_absent_identifiers() {
        let props = CheckoutProperties {
            use_preauth: true,
            affiliate_id: Some("aff-1".to_string()),
            ..CheckoutProperties::default()
        };
        let raw = props.to_raw();
        assert_eq!(raw["usePreAuthorization"], json!(true));
        assert_eq!(raw["clearPreAuthorization"], json!(false));
        assert_eq!(raw["affiliateID"], json!("aff-1"));
        assert!(raw.get("externalTransactionID").is_none());
    }
}
