//! Companies and their shop natures, the per-tenant configuration the
//! backend hands out.

use barrel_cache::{cached, call_key};
use barrel_core::{field, Store, StoreError};
use barrel_rpc::{RpcError, Schema};
use serde_json::{json, Value};
use std::time::Duration;

use crate::client::Client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: i64,
    pub number_char_classes: i64,
    pub supported_char_classes: Vec<String>,
    pub rules: Vec<String>,
}

impl Store for PasswordPolicy {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(PasswordPolicy {
            min_length: field(raw, "minimumLength").int_or(5)?,
            number_char_classes: field(raw, "requiredNumberOfCharacterClasses").int_or(0)?,
            supported_char_classes: field(raw, "supportedCharacterClasses").split_or_empty()?,
            rules: field(raw, "rules").split_or_empty()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nature {
    pub name: Option<String>,
    pub account_deletion_confirmation: Option<bool>,
    pub auth_hash_method: Option<String>,
    pub email_change_confirmation: Option<bool>,
    pub facebook_key: Option<String>,
    pub facebook_permissions: Option<String>,
    pub home_country: Option<String>,
    pub lockout_attempts: Option<i64>,
    pub lockout_duration: Option<i64>,
    pub shop_currency: Option<String>,
    pub shop_url: Option<String>,
    pub password_policy: PasswordPolicy,
}

impl Store for Nature {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Nature {
            name: field(raw, "name").string_opt()?,
            account_deletion_confirmation: field(raw, "enableAccountDeletionConfirmation")
                .boolean_opt()?,
            auth_hash_method: field(raw, "authenticationHashAlgorithm").string_opt()?,
            email_change_confirmation: field(raw, "enableEmailChangeConfirmation").boolean_opt()?,
            facebook_key: field(raw, "facebookConfiguration:applicationKey").string_opt()?,
            facebook_permissions: field(raw, "facebookConfiguration:profilePermissions")
                .string_opt()?,
            home_country: field(raw, "homeCountry").string_opt()?,
            lockout_attempts: field(raw, "loginAttemptsBeforeLockout").int_opt()?,
            lockout_duration: field(raw, "lockoutPeriodMinutes").int_opt()?,
            shop_currency: field(raw, "shopCurrency").string_opt()?,
            shop_url: field(raw, "shopUrl").string_opt()?,
            password_policy: field(raw, "passwordPolicy").embedded_or_default()?,
        })
    }
}

impl Schema for Nature {
    const INTERFACE: &'static str = "WSReaktorMgmt";
    const NAME: &'static str = "Nature";
}

impl Nature {
    pub fn get_by_name(client: &Client, name: &str) -> Result<Nature, RpcError> {
        Self::signature("getNature")
            .arg(json!(name))
            .invoke(client.transport())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub name: Option<String>,
    pub natures: Vec<Nature>,
}

impl Store for Company {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Company {
            name: field(raw, "name").string_opt()?,
            natures: field(raw, "natures").array_or_empty()?,
        })
    }
}

impl Schema for Company {
    const INTERFACE: &'static str = "WSReaktorMgmt";
    const NAME: &'static str = "Company";
}

impl Company {
    /// Companies change rarely, so this read is cached a working day.
    pub fn get_by_name(client: &Client, name: &str) -> Result<Company, RpcError> {
        let key = call_key(Self::NAME, "get_by_name", &[json!(name)]);
        let signature = Self::signature("getCompany").arg(json!(name));
        cached(
            client.cache(),
            &key,
            Duration::from_secs(3600 * 8),
            |_: Option<&Company>| true,
            |raw| Company::from_raw(raw).map_err(RpcError::from),
            || signature.invoke_raw(client.transport()),
        )?
        .ok_or_else(|| signature.missing_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nature_reads_the_nested_facebook_configuration() {
        let nature = Nature::from_raw(&json!({
            "name": "shop-de",
            "homeCountry": "DE",
            "shopCurrency": "EUR",
            "facebookConfiguration": {
                "applicationKey": "fb-key",
                "profilePermissions": "email",
            },
            "passwordPolicy": {
                "minimumLength": 8,
                "supportedCharacterClasses": "lower,upper,digit",
            },
        }))
        .unwrap();
        assert_eq!(nature.facebook_key.as_deref(), Some("fb-key"));
        assert_eq!(nature.password_policy.min_length, 8);
        assert_eq!(
            nature.password_policy.supported_char_classes,
            vec!["lower", "upper", "digit"]
        );
    }

    #[test]
    fn password_policy_defaults_apply_without_a_policy_block() {
        let nature = Nature::from_raw(&json!({"name": "bare"})).unwrap();
        assert_eq!(nature.password_policy.min_length, 5);
        assert_eq!(nature.password_policy.number_char_classes, 0);
        assert!(nature.password_policy.rules.is_empty());
    }

    #[test]
    fn company_embeds_its_natures_in_order() {
        let company = Company::from_raw(&json!({
            "name": "bookpac",
            "natures": [{"name": "shop-de"}, {"name": "shop-us"}],
        }))
        .unwrap();
        assert_eq!(company.natures.len(), 2);
        assert_eq!(company.natures[0].name.as_deref(), Some("shop-de"));
    }
}
