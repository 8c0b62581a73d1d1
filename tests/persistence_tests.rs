//! Integration tests for save, create, destroy and reload.

mod common;

use std::collections::HashMap;

use active_resource::{
    ConnectionError, ErrorMessages, Format, HttpMethod, HttpResponse, Params, Record,
    ResourceError, Value,
};
use common::{person, FakeHttp};
use serde_json::json;

fn value(value: serde_json::Value) -> Value {
    Value::from(value)
}

fn store(format: Format) -> (std::sync::Arc<FakeHttp>, active_resource::ResourceType) {
    let (http, registry, _person) = person(format);
    let store = registry.define("shop", "Store").format(format).build().unwrap();
    (http, store)
}

// ============================================================================
// Save
// ============================================================================

#[test]
fn test_save_creates_then_updates() {
    let (http, store) = store(Format::Json);
    http.respond_to(
        HttpMethod::Post,
        "stores.json",
        HttpResponse::new(201, r#"{"id": 1, "name": "General Store"}"#),
    );
    http.respond_to(
        HttpMethod::Put,
        "stores/1.json",
        HttpResponse::new(200, r#"{"store": {"manager_id": 3, "id": 1, "name": "General Store"}}"#),
    );

    let mut general = Record::new(&store, value(json!({"name": "General Store"})));
    assert!(general.is_new());
    assert!(general.save().unwrap());

    let created = http.last_request();
    assert_eq!(created.method, HttpMethod::Post);
    assert_eq!(created.body_text().as_deref(), Some(r#"{"store":{"name":"General Store"}}"#));
    assert_eq!(general.to_value(), value(json!({"id": 1, "name": "General Store"})));
    assert!(!general.is_new());

    general.set("manager_id", 3);
    assert!(general.save().unwrap());
    let updated = http.last_request();
    assert_eq!(updated.method, HttpMethod::Put);
    assert_eq!(updated.path, "stores/1.json");
    assert_eq!(
        general.to_value(),
        value(json!({"manager_id": 3, "id": 1, "name": "General Store"}))
    );
}

#[test]
fn test_save_with_xml_format() {
    let (http, store) = store(Format::Xml);
    http.respond_to(
        HttpMethod::Post,
        "stores.xml",
        HttpResponse::new(
            201,
            r#"<?xml version="1.0" encoding="UTF-8"?><store><id type="integer">1</id><name>General Store</name></store>"#,
        ),
    );

    let mut general = Record::new(&store, value(json!({"name": "General Store"})));
    assert!(general.save().unwrap());

    assert_eq!(general.to_value(), value(json!({"id": 1, "name": "General Store"})));
    let body = http.last_request().body_text().unwrap();
    assert!(body.starts_with("<?xml"));
    assert!(body.contains("<store><name>General Store</name></store>"));
}

#[test]
fn test_save_clears_errors() {
    let (http, store) = store(Format::Json);
    http.respond_to(
        HttpMethod::Post,
        "stores.json",
        HttpResponse::new(201, r#"{"id": 1, "name": "General Store"}"#),
    );

    let mut general = Record::new(&store, value(json!({"name": "General Store"})));
    general.errors_mut().add_to_base("bad things!");
    assert!(!general.is_valid());

    assert!(general.save().unwrap());
    assert_eq!(general.errors().size(), 0);
}

#[test]
fn test_save_with_json_errors() {
    let (http, store) = store(Format::Json);
    http.respond_to(
        HttpMethod::Post,
        "stores.json",
        HttpResponse::new(422, r#"{"errors":{"name":["already exists"]}}"#),
    );

    let mut general = Record::new(&store, value(json!({"name": "General Store"})));

    assert!(!general.save().unwrap());
    assert_eq!(general.errors().on("name"), ErrorMessages::Single("already exists"));
    assert_eq!(general.errors().len(), 1);
    assert!(general.is_new());
}

#[test]
fn test_save_with_xml_errors() {
    let (http, store) = store(Format::Xml);
    http.respond_to(
        HttpMethod::Post,
        "stores.xml",
        HttpResponse::new(
            422,
            "<errors>\n  <error>Name already exists</error>\n</errors>",
        ),
    );

    let mut general = Record::new(&store, value(json!({"name": "General Store"})));

    assert!(!general.save().unwrap());
    assert_eq!(general.errors().messages_for("name"), ["already exists".to_string()]);
    assert_eq!(general.errors().full_messages(), vec!["name already exists".to_string()]);
}

#[test]
fn test_save_propagates_other_errors() {
    let (http, store) = store(Format::Json);
    http.respond_to(HttpMethod::Post, "stores.json", HttpResponse::new(409, ""));

    let mut general = Record::new(&store, value(json!({"name": "General Store"})));

    let error = general.save().unwrap_err();
    assert!(matches!(
        error,
        ResourceError::Connection(ConnectionError::ResourceConflict(_))
    ));
}

#[test]
fn test_save_with_empty_or_invalid_body_succeeds() {
    let (http, store) = store(Format::Json);
    http.respond_to(HttpMethod::Put, "stores/1.json", HttpResponse::new(204, ""));
    http.respond_to(HttpMethod::Put, "stores/2.json", HttpResponse::new(200, "<html>ok</html>"));

    let mut first = Record::new(&store, value(json!({"id": 1, "name": "One"})));
    assert!(first.save().unwrap());
    assert_eq!(first.to_value(), value(json!({"id": 1, "name": "One"})));

    let mut second = Record::new(&store, value(json!({"id": 2, "name": "Two"})));
    assert!(second.save().unwrap());
    assert_eq!(second.to_value(), value(json!({"id": 2, "name": "Two"})));
}

#[test]
fn test_save_takes_id_from_location() {
    for header in ["Location", "location"] {
        let (http, _registry, person) = person(Format::Json);
        http.respond_to(
            HttpMethod::Post,
            "people.json",
            HttpResponse::new(201, "").with_header(header, "/people/7.json"),
        );

        let created = person.create(value(json!({}))).unwrap();

        assert_eq!(created.id(), Some(&Value::from(7)));
        assert!(created.is_valid());
    }
}

#[test]
fn test_save_takes_id_from_mixed_case_header_key() {
    for header in ["Location", "location", "LOCATION"] {
        let (http, _registry, person) = person(Format::Json);
        http.respond_to(
            HttpMethod::Post,
            "people.json",
            HttpResponse {
                code: 201,
                headers: HashMap::from([(header.to_string(), vec!["/people/7.json".to_string()])]),
                ..HttpResponse::default()
            },
        );

        let mut matz = Record::new(&person, value(json!({"name": "Matz"})));
        assert!(matz.save().unwrap());

        assert_eq!(matz.id(), Some(&Value::from(7)));
    }
}

#[test]
fn test_save_keeps_string_ids_from_location() {
    let (http, _registry, person) = person(Format::Json);
    http.respond_to(
        HttpMethod::Post,
        "people.json",
        HttpResponse::new(201, "").with_header("Location", "http://localhost/people/matz"),
    );

    let created = person.create(value(json!({"name": "Matz"}))).unwrap();

    assert_eq!(created.id(), Some(&Value::from("matz")));
}

#[test]
fn test_create_returns_invalid_record() {
    let (http, _registry, person) = person(Format::Json);
    http.respond_to(
        HttpMethod::Post,
        "people.json",
        HttpResponse::new(422, r#"{"errors": ["Name can't be blank"]}"#),
    );

    let created = person.create(value(json!({"name": ""}))).unwrap();

    assert!(!created.is_valid());
    assert_eq!(created.errors().on("name"), ErrorMessages::Single("can't be blank"));
}

#[test]
fn test_save_nested_record_uses_prefix_options() {
    let http = FakeHttp::new();
    let registry = common::registry_with(&http, "http://localhost");
    let comment = registry
        .define("blog", "Comment")
        .site("http://localhost/posts/$post_id/")
        .build()
        .unwrap();
    http.respond_to(
        HttpMethod::Post,
        "posts/5/comments.json",
        HttpResponse::new(201, "").with_header("Location", "/posts/5/comments/12.json"),
    );

    let mut prefix = Params::new();
    prefix.insert("post_id".to_string(), Value::from(5));
    let mut reply = Record::from_value(&comment, value(json!({"body": "First!"})), prefix);

    assert!(reply.save().unwrap());
    assert_eq!(reply.id(), Some(&Value::from(12)));
}

// ============================================================================
// Destroy and reload
// ============================================================================

#[test]
fn test_destroy_sends_delete() {
    let (http, _registry, person) = person(Format::Json);
    http.respond_to(HttpMethod::Delete, "people/1.json", HttpResponse::new(200, ""));
    let matz = Record::new(&person, value(json!({"id": 1, "name": "Matz"})));

    matz.destroy().unwrap();

    assert_eq!(http.last_request().method, HttpMethod::Delete);
    assert_eq!(matz.id(), Some(&Value::from(1)));
}

#[test]
fn test_destroy_missing_record_fails() {
    let (_http, _registry, person) = person(Format::Json);
    let ghost = Record::new(&person, value(json!({"id": 404})));
    assert!(ghost.destroy().unwrap_err().is_not_found());
}

#[test]
fn test_reload_replaces_attributes() {
    let (http, _registry, person) = person(Format::Json);
    http.get("people/1.json", 200, r#"{"person": {"id": 1, "name": "Arnold Ziffel"}}"#);

    let mut arnold = person.find(1, &Params::new()).unwrap();
    arnold.set("name", "someone else");
    arnold.reload().unwrap();

    assert_eq!(arnold.to_value(), value(json!({"id": 1, "name": "Arnold Ziffel"})));
}

#[test]
fn test_reload_keeps_prefix_options() {
    let http = FakeHttp::new();
    let registry = common::registry_with(&http, "http://localhost");
    let address = registry
        .define("shop", "Address")
        .site("http://localhost/people/$person_id/")
        .build()
        .unwrap();
    http.get("people/1/addresses/1.json", 200, r#"{"address": {"id": 1, "person_id": 2}}"#);

    let mut prefix = Params::new();
    prefix.insert("person_id".to_string(), Value::from(1));
    let mut addy = address.find(1, &prefix).unwrap();
    addy.reload().unwrap();

    assert_eq!(addy.prefix_options(), &prefix);
    assert_eq!(http.last_request().path, "people/1/addresses/1.json");
}
