//! Vouchers and gift cards. The same schema decodes both the vouchers
//! assigned to an account and the voucher fragment embedded in basket
//! positions.

use barrel_core::{decode_array, field, Store, StoreError};
use barrel_rpc::{RpcError, Schema};
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::client::Client;
use crate::models::Price;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voucher {
    pub code: Option<String>,
    pub text: Option<String>,
    pub percentage: Option<i64>,
    pub valid_from: Option<OffsetDateTime>,
    pub expiration_date: Option<OffsetDateTime>,
    pub initial_amount: Option<Price>,
    pub amount: Option<Price>,
    java_class: Option<String>,
}

impl Store for Voucher {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Voucher {
            code: field(raw, "code").string_opt()?,
            text: field(raw, "text").string_opt()?,
            percentage: field(raw, "percentage").int_opt()?,
            valid_from: field(raw, "validFrom").date_opt()?,
            expiration_date: field(raw, "expirationDate").date_opt()?,
            initial_amount: field(raw, "initialAmount").embedded_opt()?,
            amount: field(raw, "amount").embedded_opt()?,
            java_class: field(raw, "javaClass").string_opt()?,
        })
    }
}

impl Schema for Voucher {
    const INTERFACE: &'static str = "WSVoucherMgmt";
    const NAME: &'static str = "Voucher";
}

impl Voucher {
    /// Fixed-amount voucher, as opposed to a percentage discount.
    pub fn is_amount(&self) -> bool {
        self.java_class
            .as_deref()
            .map_or(false, |cls| cls.contains("WSTAmountVoucher"))
    }

    pub fn is_percent(&self) -> bool {
        self.java_class
            .as_deref()
            .map_or(false, |cls| cls.contains("WSTPercentVoucher"))
    }

    /// The vouchers assigned to the token's account.
    pub fn get(client: &Client, token: &str) -> Result<Vec<Voucher>, RpcError> {
        Self::signature("getAssignedVouchers")
            .arg(json!(token))
            .invoke_with(client.transport(), |raw| {
                decode_array(raw, "vouchers", Voucher::from_raw).map_err(RpcError::from)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminates_on_the_java_class() {
        let voucher = Voucher::from_raw(&json!({
            "code": "XMAS-2026",
            "javaClass": "com.bookpac.server.shop.voucher.WSTAmountVoucher",
            "initialAmount": {"amount": 25, "currency": "EUR"},
            "amount": {"amount": 10.5, "currency": "EUR"},
        }))
        .unwrap();
        assert!(voucher.is_amount());
        assert!(!voucher.is_percent());
        assert_eq!(voucher.amount.unwrap().amount, "10.5".parse().unwrap());
    }

    #[test]
    fn percent_vouchers_carry_no_amounts() {
        let voucher = Voucher::from_raw(&json!({
            "code": "TEN-OFF",
            "percentage": 10,
            "javaClass": "com.bookpac.server.shop.voucher.WSTPercentVoucher",
        }))
        .unwrap();
        assert!(voucher.is_percent());
        assert_eq!(voucher.percentage, Some(10));
        assert_eq!(voucher.amount, None);
    }
}
