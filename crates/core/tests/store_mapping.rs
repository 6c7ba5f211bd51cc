//! End-to-end mapping checks: declaring a small schema, decoding it from
//! a raw response fragment, and reading back every field.

use barrel_core::{decode_array, field, Store, StoreError};
use serde_json::{json, Value};

#[derive(Debug, PartialEq)]
struct Author {
    first_name: String,
    last_name: String,
}

impl Store for Author {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Author {
            first_name: field(raw, "firstName").string()?,
            last_name: field(raw, "lastName").string()?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct Book {
    id: String,
    title: String,
    pages: Option<i64>,
    stars: i64,
    tags: Vec<String>,
    authors: Vec<Author>,
    reprint: Option<Box<Book>>,
}

impl Store for Book {
    fn from_raw(raw: &Value) -> Result<Self, StoreError> {
        Ok(Book {
            id: field(raw, "bookID").string()?,
            title: field(raw, "title").string_or("")?,
            pages: field(raw, "pages").int_opt()?,
            stars: field(raw, "votes:stars").int_or(0)?,
            tags: field(raw, "tags").strings_or_empty()?,
            authors: field(raw, "authors").array_or_empty()?,
            reprint: field(raw, "reprint").embedded_opt()?.map(Box::new),
        })
    }
}

fn fixture() -> Value {
    json!({
        "bookID": "b-1",
        "title": "Der Proceß",
        "pages": 255,
        "votes": {"stars": 4},
        "tags": ["kafka", "novel"],
        "authors": [
            {"firstName": "Franz", "lastName": "Kafka"},
            {"firstName": "Max", "lastName": "Brod"},
        ],
        "reprint": {
            "bookID": "b-2",
            "votes": {},
        },
    })
}

#[test]
fn round_trip_matches_direct_coercion() {
    let raw = fixture();
    let book = Book::from_raw(&raw).unwrap();

    assert_eq!(book.id, field(&raw, "bookID").string().unwrap());
    assert_eq!(book.title, field(&raw, "title").string_or("").unwrap());
    assert_eq!(book.pages, field(&raw, "pages").int_opt().unwrap());
    assert_eq!(book.stars, field(&raw, "votes:stars").int_or(0).unwrap());
    assert_eq!(book.tags, field(&raw, "tags").strings_or_empty().unwrap());
}

#[test]
fn decoding_never_mutates_the_raw_mapping() {
    let raw = fixture();
    let before = raw.clone();
    let _ = Book::from_raw(&raw).unwrap();
    let _ = Book::from_raw(&raw).unwrap();
    assert_eq!(raw, before);
}

#[test]
fn array_embedding_preserves_order() {
    let book = Book::from_raw(&fixture()).unwrap();
    let names: Vec<&str> = book
        .authors
        .iter()
        .map(|a| a.first_name.as_str())
        .collect();
    assert_eq!(names, ["Franz", "Max"]);
}

#[test]
fn absent_embedded_is_none_and_defaults_apply_recursively() {
    let book = Book::from_raw(&fixture()).unwrap();
    let reprint = book.reprint.expect("reprint present");
    assert_eq!(reprint.title, "");
    assert_eq!(reprint.stars, 0);
    assert_eq!(reprint.pages, None);
    assert!(reprint.reprint.is_none());
    assert!(reprint.authors.is_empty());
}

#[test]
fn missing_required_field_fails_decoding() {
    let err = Book::from_raw(&json!({"title": "no id"})).unwrap_err();
    assert_eq!(
        err,
        StoreError::MissingField {
            target: "bookID".to_string()
        }
    );
}

#[test]
fn top_level_arrays_decode_in_order() {
    let raw = json!([
        {"firstName": "A", "lastName": "B"},
        {"firstName": "C", "lastName": "D"},
    ]);
    let authors: Vec<Author> = decode_array(&raw, "authors", Author::from_raw).unwrap();
    assert_eq!(authors[0].first_name, "A");
    assert_eq!(authors[1].first_name, "C");
}

#[test]
fn non_array_where_array_expected_is_type_mismatch() {
    let err = decode_array::<Author>(&json!(7), "authors", Author::from_raw).unwrap_err();
    assert!(matches!(err, StoreError::TypeMismatch { .. }));
}
