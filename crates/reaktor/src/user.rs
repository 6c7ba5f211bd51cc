//! Accounts and authentication sessions.

use barrel_core::{field, Store, StoreError};
use barrel_rpc::{RpcError, Schema, Signature};
use serde_json::{json, Value};
use time::OffsetDateTime;

use crate::client::Client;

/// The shop address stored as flat `com.bookpac.user.settings.shop.*`
/// settings keys. The dots are part of the key names, not nesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub country: Option<String>,
    pub firstname: Option<String>,
    pub is_valid: Option<String>,
    pub lastname: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub street: Option<String>,
    pub zipcode: Option<String>,
}

impl Store for Address {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Address {
            country: field(raw, "com.bookpac.user.settings.shop.country").string_opt()?,
            firstname: field(raw, "com.bookpac.user.settings.shop.firstname").string_opt()?,
            is_valid: field(raw, "com.bookpac.user.settings.shop.address.valid").string_opt()?,
            lastname: field(raw, "com.bookpac.user.settings.shop.lastname").string_opt()?,
            location: field(raw, "com.bookpac.user.settings.shop.location").string_opt()?,
            state: field(raw, "com.bookpac.user.settings.shop.state").string_opt()?,
            street: field(raw, "com.bookpac.user.settings.shop.address1").string_opt()?,
            zipcode: field(raw, "com.bookpac.user.settings.shop.zipcode").string_opt()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub address: Address,
    pub company: Option<String>,
    pub disabled: Option<bool>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub level: Option<String>,
    pub locale: Option<String>,
    pub name: Option<String>,
    pub nature: Option<String>,
    pub private_name: Option<String>,
    pub roles: Vec<String>,
    pub verified: Option<bool>,
}

impl Store for User {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(User {
            id: field(raw, "userID").string()?,
            address: field(raw, "settings").embedded_or_default()?,
            company: field(raw, "company").string_opt()?,
            disabled: field(raw, "disabled").boolean_opt()?,
            email: field(raw, "EMail").string_opt()?,
            image_url: field(raw, "userImageUrl").string_opt()?,
            level: field(raw, "userLevel").string_opt()?,
            locale: field(raw, "settings:com.bookpac.user.settings.locale").string_opt()?,
            name: field(raw, "userName").string_opt()?,
            nature: field(raw, "userNature").string_opt()?,
            private_name: field(raw, "userPrivateName").string_opt()?,
            roles: field(raw, "roles").strings_or_empty()?,
            verified: field(raw, "emailVerified").boolean_opt()?,
        })
    }
}

impl Schema for User {
    const INTERFACE: &'static str = "WSUserMgmt";
    const NAME: &'static str = "User";
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn get_by_token(client: &Client, token: &str) -> Result<User, RpcError> {
        Self::signature("getUser")
            .arg(json!(token))
            .invoke(client.transport())
    }
}

/// The authentication result: session token, result code, and the
/// resolved account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    pub date: Option<OffsetDateTime>,
    pub result_code: Option<String>,
    pub service_name: Option<String>,
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Store for Auth {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Auth {
            date: field(raw, "timestamp").date_opt()?,
            result_code: field(raw, "resultCode").string_opt()?,
            service_name: field(raw, "authenticationServiceName").string_opt()?,
            token: field(raw, "token").string_opt()?,
            user: field(raw, "user").embedded_opt()?,
        })
    }
}

impl Schema for Auth {
    const INTERFACE: &'static str = "WSAuth";
    const NAME: &'static str = "Auth";
}

impl Auth {
    /// Authenticated against the local user base, as opposed to an
    /// external service like Facebook.
    pub fn is_local(&self) -> bool {
        self.service_name.as_deref() == Some("LOCAL")
    }

    pub fn authenticate_with_credentials(
        client: &Client,
        name: &str,
        hashed_pwd: &str,
        nature: &str,
        sticky: bool,
    ) -> Result<Auth, RpcError> {
        Self::signature("authenticate")
            .args([json!(name), json!(hashed_pwd), json!(nature), json!(sticky)])
            .invoke(client.transport())
    }

    /// Auth through an external credential service, Facebook being the
    /// usual one.
    pub fn authenticate_with_external_credentials(
        client: &Client,
        token: &str,
        service_name: &str,
        params: Value,
        sticky: bool,
    ) -> Result<Auth, RpcError> {
        Self::signature("authenticateWithExternalCredentials")
            .args([json!(token), json!(service_name), params, json!(sticky)])
            .invoke(client.transport())
    }

    pub fn authenticate_as_anonymous(client: &Client, nature: &str) -> Result<Auth, RpcError> {
        Self::signature("authenticateAnonymousUser")
            .arg(json!(nature))
            .invoke(client.transport())
    }

    /// Regular auth for an anonymous session that should keep its
    /// accumulated data, the basket in particular.
    pub fn authenticate_anonymous(
        client: &Client,
        token: &str,
        name: &str,
        hashed_pwd: &str,
        sticky: bool,
    ) -> Result<Auth, RpcError> {
        Self::signature("authenticate")
            .args([json!(token), json!(name), json!(hashed_pwd), json!(sticky)])
            .invoke(client.transport())
    }

    pub fn deauthenticate(client: &Client, token: &str) -> Result<(), RpcError> {
        Self::signature("deAuthenticate")
            .arg(json!(token))
            .invoke_unit(client.transport())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_user_from_anonymous(
        client: &Client,
        token: &str,
        name: &str,
        email: &str,
        captcha_id: &str,
        captcha_value: &str,
        hashed_pwd1: &str,
        hashed_pwd2: &str,
    ) -> Result<Auth, RpcError> {
        Self::signature("promoteAnonymousUser")
            .args([
                json!(token),
                json!(name),
                json!(email),
                json!(captcha_id),
                json!(captcha_value),
                json!(hashed_pwd1),
                json!(hashed_pwd2),
            ])
            .invoke(client.transport())
    }

    pub fn create_user(
        client: &Client,
        name: &str,
        email: &str,
        hashed_pwd: &str,
        settings: Value,
        nature: &str,
    ) -> Result<Auth, RpcError> {
        Self::signature("createUserWithSettings")
            .args([
                json!(name),
                json!(email),
                json!(hashed_pwd),
                settings,
                json!(nature),
            ])
            .invoke(client.transport())
    }

    pub fn request_user_creation(
        client: &Client,
        name: &str,
        email: &str,
        hashed_pwd: &str,
        settings: Value,
        nature: &str,
    ) -> Result<(), RpcError> {
        Self::signature("requestUserCreationWithSettings")
            .args([
                json!(name),
                json!(email),
                json!(hashed_pwd),
                settings,
                json!(nature),
            ])
            .invoke_unit(client.transport())
    }

    pub fn request_password_reset(
        client: &Client,
        name: &str,
        nature: &str,
    ) -> Result<(), RpcError> {
        Self::signature("requestPasswordResetForUser")
            .args([json!(name), json!(nature)])
            .invoke_unit(client.transport())
    }

    /// Completes a password reset through the generic action-request
    /// executor rather than the auth interface.
    pub fn reset_password(
        client: &Client,
        token: &str,
        action: &str,
        secret: &str,
        hashed_pwd: &str,
    ) -> Result<(), RpcError> {
        Signature::new("WSActionRequestMgmt", "execute")
            .args([
                json!(token),
                json!(action),
                json!(secret),
                json!({"pw": hashed_pwd}),
            ])
            .invoke_unit(client.transport())
    }
}
