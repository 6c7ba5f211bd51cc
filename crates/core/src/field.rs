//! Typed field accessors with coercion and defaults.
//!
//! [`field`] resolves one target path and hands back a [`FieldRef`] whose
//! accessors coerce the raw value into the declared type. Every accessor
//! comes in three strictnesses: plain (absent path fails with
//! `MissingField`), `_or` (absent path yields the given default) and
//! `_opt` (absent path yields `None`). A present value that cannot be
//! coerced always fails with `TypeMismatch` — defaults cover absence,
//! never backend type skew.

use rust_decimal::Decimal;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::StoreError;
use crate::path;
use crate::store::{decode_array, Store};

/// One field access: the resolved (possibly absent) raw value plus the
/// target path it was declared under.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    target: &'a str,
    value: Option<&'a Value>,
}

/// Resolve `target` against `raw` for typed access.
///
/// Explicit JSON `null` counts as absent, exactly like a missing key.
pub fn field<'a>(raw: &'a Value, target: &'a str) -> FieldRef<'a> {
    FieldRef {
        target,
        value: path::resolve(raw, target).filter(|v| !v.is_null()),
    }
}

impl<'a> FieldRef<'a> {
    /// The declared target path.
    pub fn target(&self) -> &str {
        self.target
    }

    /// The resolved raw value, if present.
    pub fn raw(&self) -> Option<&'a Value> {
        self.value
    }

    /// Whether the target path resolved to a non-null value.
    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    fn missing(&self) -> StoreError {
        StoreError::MissingField {
            target: self.target.to_string(),
        }
    }

    fn mismatch(&self, expected: &'static str, actual: &Value) -> StoreError {
        StoreError::TypeMismatch {
            target: self.target.to_string(),
            expected,
            actual: render_short(actual),
        }
    }

    fn coerced<T>(
        &self,
        expected: &'static str,
        coerce: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, StoreError> {
        match self.value {
            None => Ok(None),
            Some(v) => coerce(v)
                .map(Some)
                .ok_or_else(|| self.mismatch(expected, v)),
        }
    }

    // ── strings ─────────────────────────────────────────────────────

    pub fn string(self) -> Result<String, StoreError> {
        self.string_opt()?.ok_or_else(|| self.missing())
    }

    pub fn string_or(self, default: &str) -> Result<String, StoreError> {
        Ok(self.string_opt()?.unwrap_or_else(|| default.to_string()))
    }

    pub fn string_opt(self) -> Result<Option<String>, StoreError> {
        self.coerced("string", coerce_string)
    }

    // ── booleans ────────────────────────────────────────────────────

    pub fn boolean(self) -> Result<bool, StoreError> {
        self.boolean_opt()?.ok_or_else(|| self.missing())
    }

    pub fn boolean_or(self, default: bool) -> Result<bool, StoreError> {
        Ok(self.boolean_opt()?.unwrap_or(default))
    }

    pub fn boolean_opt(self) -> Result<Option<bool>, StoreError> {
        self.coerced("boolean", coerce_bool)
    }

    // ── integers ────────────────────────────────────────────────────

    pub fn int(self) -> Result<i64, StoreError> {
        self.int_opt()?.ok_or_else(|| self.missing())
    }

    pub fn int_or(self, default: i64) -> Result<i64, StoreError> {
        Ok(self.int_opt()?.unwrap_or(default))
    }

    pub fn int_opt(self) -> Result<Option<i64>, StoreError> {
        self.coerced("integer", coerce_i64)
    }

    /// Wide integer parse for backend ids that can exceed native ranges
    /// in other client runtimes (ISBNs, voucher codes). Accepts JSON
    /// numbers and numeric strings.
    pub fn long_int(self) -> Result<i128, StoreError> {
        self.long_int_opt()?.ok_or_else(|| self.missing())
    }

    pub fn long_int_opt(self) -> Result<Option<i128>, StoreError> {
        self.coerced("long integer", coerce_i128)
    }

    // ── floats / decimals ───────────────────────────────────────────

    pub fn float(self) -> Result<f64, StoreError> {
        self.float_opt()?.ok_or_else(|| self.missing())
    }

    pub fn float_or(self, default: f64) -> Result<f64, StoreError> {
        Ok(self.float_opt()?.unwrap_or(default))
    }

    pub fn float_opt(self) -> Result<Option<f64>, StoreError> {
        self.coerced("float", coerce_f64)
    }

    /// Exact decimal parse, used for money amounts.
    pub fn decimal(self) -> Result<Decimal, StoreError> {
        self.decimal_opt()?.ok_or_else(|| self.missing())
    }

    pub fn decimal_opt(self) -> Result<Option<Decimal>, StoreError> {
        self.coerced("decimal", coerce_decimal)
    }

    // ── dates ───────────────────────────────────────────────────────

    /// The backend renders timestamps either as RFC 3339 strings (with or
    /// without an offset; offsetless values are UTC) or as integer epoch
    /// milliseconds.
    pub fn date(self) -> Result<OffsetDateTime, StoreError> {
        self.date_opt()?.ok_or_else(|| self.missing())
    }

    pub fn date_opt(self) -> Result<Option<OffsetDateTime>, StoreError> {
        self.coerced("date", coerce_date)
    }

    // ── delimited strings ───────────────────────────────────────────

    /// A comma-delimited string split into an ordered list, entries
    /// trimmed. A raw array of strings is accepted as already split.
    pub fn split(self) -> Result<Vec<String>, StoreError> {
        self.split_opt()?.ok_or_else(|| self.missing())
    }

    pub fn split_or_empty(self) -> Result<Vec<String>, StoreError> {
        Ok(self.split_opt()?.unwrap_or_default())
    }

    fn split_opt(self) -> Result<Option<Vec<String>>, StoreError> {
        self.coerced("delimited string", coerce_split)
    }

    // ── scalar arrays ───────────────────────────────────────────────

    pub fn strings(self) -> Result<Vec<String>, StoreError> {
        self.strings_opt()?.ok_or_else(|| self.missing())
    }

    pub fn strings_or_empty(self) -> Result<Vec<String>, StoreError> {
        Ok(self.strings_opt()?.unwrap_or_default())
    }

    fn strings_opt(self) -> Result<Option<Vec<String>>, StoreError> {
        self.coerced("string array", |v| {
            v.as_array()
                .map(|items| items.iter().map(coerce_string).collect::<Option<Vec<_>>>())?
        })
    }

    // ── embedded stores ─────────────────────────────────────────────

    /// Decode one nested mapping as an embedded store.
    pub fn embedded<T: Store>(self) -> Result<T, StoreError> {
        match self.value {
            Some(v) => T::from_raw(v),
            None => Err(self.missing()),
        }
    }

    pub fn embedded_opt<T: Store>(self) -> Result<Option<T>, StoreError> {
        match self.value {
            Some(v) => T::from_raw(v).map(Some),
            None => Ok(None),
        }
    }

    /// Decode a nested mapping, falling back to the store's own field
    /// defaults when the path is absent. Only meaningful for stores
    /// whose every field is optional or default-bearing.
    pub fn embedded_or_default<T: Store>(self) -> Result<T, StoreError> {
        T::from_raw(self.value.unwrap_or(&Value::Null))
    }

    /// Decode one nested mapping through an explicit decoder, for
    /// polymorphic fragments dispatched by a
    /// [`VariantRegistry`](crate::VariantRegistry).
    pub fn embedded_with<T>(
        self,
        decode: impl FnOnce(&Value) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match self.value {
            Some(v) => decode(v),
            None => Err(self.missing()),
        }
    }

    /// Decode an ordered sequence of nested mappings, preserving order.
    pub fn array<T: Store>(self) -> Result<Vec<T>, StoreError> {
        self.array_with(T::from_raw)
    }

    pub fn array_or_empty<T: Store>(self) -> Result<Vec<T>, StoreError> {
        self.array_with_or_empty(T::from_raw)
    }

    /// Array decoding through an explicit decoder, for polymorphic
    /// elements dispatched by a [`VariantRegistry`](crate::VariantRegistry).
    pub fn array_with<T>(
        self,
        decode: impl Fn(&Value) -> Result<T, StoreError>,
    ) -> Result<Vec<T>, StoreError> {
        match self.value {
            Some(v) => decode_array(v, self.target, decode),
            None => Err(self.missing()),
        }
    }

    pub fn array_with_or_empty<T>(
        self,
        decode: impl Fn(&Value) -> Result<T, StoreError>,
    ) -> Result<Vec<T>, StoreError> {
        match self.value {
            Some(v) => decode_array(v, self.target, decode),
            None => Ok(Vec::new()),
        }
    }
}

// ── coercions ───────────────────────────────────────────────────────

fn coerce_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        // Identity fields tolerate numeric ids rendered as numbers.
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

fn coerce_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_i128(v: &Value) -> Option<i128> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_date(v: &Value) -> Option<OffsetDateTime> {
    const OFFSETLESS: &[time::format_description::BorrowedFormatItem<'static>] =
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    match v {
        Value::String(s) => OffsetDateTime::parse(s, &Rfc3339).ok().or_else(|| {
            PrimitiveDateTime::parse(s, OFFSETLESS)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        }),
        Value::Number(n) => n.as_i64().and_then(|millis| {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
        }),
        _ => None,
    }
}

fn coerce_split(v: &Value) -> Option<Vec<String>> {
    match v {
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Value::Array(items) => items.iter().map(coerce_string).collect(),
        _ => None,
    }
}

fn render_short(v: &Value) -> String {
    let rendered = v.to_string();
    match rendered.char_indices().nth(48) {
        Some((cut, _)) => format!("{}…", &rendered[..cut]),
        None => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_with_default_yields_default() {
        let raw = json!({});
        assert_eq!(field(&raw, "title").string_or("").unwrap(), "");
        assert_eq!(field(&raw, "stars").int_or(0).unwrap(), 0);
        assert!(!field(&raw, "checkedOut").boolean_or(false).unwrap());
    }

    #[test]
    fn absent_without_default_is_missing_field() {
        let raw = json!({"other": 1});
        assert_eq!(
            field(&raw, "documentID").string(),
            Err(StoreError::MissingField {
                target: "documentID".to_string()
            })
        );
    }

    #[test]
    fn explicit_null_behaves_as_absent() {
        let raw = json!({"title": null});
        assert_eq!(field(&raw, "title").string_or("x").unwrap(), "x");
        assert_eq!(field(&raw, "title").string_opt().unwrap(), None);
    }

    #[test]
    fn present_value_ignores_default() {
        let raw = json!({"title": "Effi Briest"});
        assert_eq!(field(&raw, "title").string_or("").unwrap(), "Effi Briest");
    }

    #[test]
    fn boolean_accepts_backend_tokens() {
        for (token, expected) in [
            (json!(true), true),
            (json!("true"), true),
            (json!("Yes"), true),
            (json!("1"), true),
            (json!(1), true),
            (json!(false), false),
            (json!("false"), false),
            (json!("no"), false),
            (json!("0"), false),
            (json!(0), false),
        ] {
            let raw = json!({ "flag": token });
            assert_eq!(field(&raw, "flag").boolean().unwrap(), expected);
        }
    }

    #[test]
    fn unknown_boolean_token_is_type_mismatch() {
        let raw = json!({"flag": "maybe"});
        assert!(matches!(
            field(&raw, "flag").boolean(),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn numbers_parse_from_strings() {
        let raw = json!({"pages": "312", "ratio": "0.75"});
        assert_eq!(field(&raw, "pages").int().unwrap(), 312);
        assert_eq!(field(&raw, "ratio").float().unwrap(), 0.75);
    }

    #[test]
    fn long_int_covers_values_past_u64() {
        let raw = json!({"isbn": "170141183460469231731687303715884105727"});
        assert_eq!(field(&raw, "isbn").long_int().unwrap(), i128::MAX);
        let raw = json!({"isbn": 9783869740034_i64});
        assert_eq!(field(&raw, "isbn").long_int().unwrap(), 9783869740034);
    }

    #[test]
    fn decimal_is_exact() {
        let raw = json!({"amount": 12.99});
        assert_eq!(
            field(&raw, "amount").decimal().unwrap(),
            "12.99".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn dates_parse_rfc3339_offsetless_and_epoch_millis() {
        let raw = json!({
            "a": "2012-05-21T13:04:31Z",
            "b": "2012-05-21T13:04:31",
            "c": 1337605471000_i64,
        });
        let expected = OffsetDateTime::from_unix_timestamp(1_337_605_471).unwrap();
        assert_eq!(field(&raw, "a").date().unwrap(), expected);
        assert_eq!(field(&raw, "b").date().unwrap(), expected);
        assert_eq!(field(&raw, "c").date().unwrap(), expected);
    }

    #[test]
    fn split_trims_and_preserves_order() {
        let raw = json!({"rules": "lower, upper ,digit"});
        assert_eq!(
            field(&raw, "rules").split().unwrap(),
            vec!["lower", "upper", "digit"]
        );
        let raw = json!({"rules": ""});
        assert_eq!(field(&raw, "rules").split().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn split_accepts_pre_split_arrays() {
        let raw = json!({"rules": ["lower", "digit"]});
        assert_eq!(
            field(&raw, "rules").split().unwrap(),
            vec!["lower", "digit"]
        );
    }

    #[test]
    fn nested_target_reads_through_segments() {
        let raw = json!({"personalVotes": {"stars": 3}});
        assert_eq!(field(&raw, "personalVotes:stars").int_or(0).unwrap(), 3);
    }

    #[test]
    fn strings_or_empty_defaults_on_absent() {
        let raw = json!({});
        assert_eq!(
            field(&raw, "userTags").strings_or_empty().unwrap(),
            Vec::<String>::new()
        );
    }
}
