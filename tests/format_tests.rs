//! Integration tests for the XML and JSON codecs, and for encoding records.

mod common;

use active_resource::formats::{json, xml};
use active_resource::{FileAttachment, Format, Map, Record, Value, XmlOptions};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::json;

const TOPICS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<topics type="array">
  <topic>
    <title>The First Topic</title>
    <author-name>David</author-name>
    <id type="integer">1</id>
    <approved type="boolean"> true </approved>
    <replies-count type="integer">0</replies-count>
    <replies-close-in type="integer">2592000000</replies-close-in>
    <written-on type="date">2003-07-16</written-on>
    <viewed-at type="datetime">2003-07-16T09:28:00+0000</viewed-at>
    <author-email-address>david@loudthinking.com</author-email-address>
    <parent-id></parent-id>
    <ad-revenue type="decimal">1.5</ad-revenue>
    <optimum-viewing-angle type="float">135</optimum-viewing-angle>
    <resident type="symbol">yes</resident>
  </topic>
  <topic>
    <title>The Second Topic</title>
    <id type="integer">2</id>
    <approved type="boolean">false</approved>
    <parent-id type="integer" nil="true"/>
  </topic>
</topics>"#;

fn plain() -> XmlOptions {
    XmlOptions {
        header: false,
        ..XmlOptions::default()
    }
}

fn text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

// ============================================================================
// XML decoding
// ============================================================================

#[test]
fn test_decode_topics_fixture() {
    let decoded = xml::decode(TOPICS_XML.as_bytes(), true).unwrap();
    let topics = decoded.as_list().unwrap();
    assert_eq!(topics.len(), 2);

    let first = &topics[0];
    assert_eq!(first.get("title"), Some(&Value::from("The First Topic")));
    assert_eq!(first.get("author_name"), Some(&Value::from("David")));
    assert_eq!(first.get("id"), Some(&Value::Integer(1)));
    assert_eq!(first.get("approved"), Some(&Value::Bool(true)));
    assert_eq!(first.get("replies_count"), Some(&Value::Integer(0)));
    assert_eq!(first.get("replies_close_in"), Some(&Value::Integer(2_592_000_000)));
    assert_eq!(
        first.get("written_on"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2003, 7, 16).unwrap()))
    );
    assert_eq!(
        first.get("viewed_at"),
        Some(&Value::DateTime(
            DateTime::parse_from_rfc3339("2003-07-16T09:28:00+00:00").unwrap()
        ))
    );
    assert_eq!(first.get("parent_id"), Some(&Value::Null));
    assert_eq!(first.get("ad_revenue"), Some(&Value::Decimal(Decimal::new(15, 1))));
    assert_eq!(first.get("optimum_viewing_angle"), Some(&Value::Float(135.0)));
    assert_eq!(first.get("resident"), Some(&Value::from("yes")));

    let second = &topics[1];
    assert_eq!(second.get("approved"), Some(&Value::Bool(false)));
    assert_eq!(second.get("parent_id"), Some(&Value::Null));
}

#[test]
fn test_decode_keeps_root_for_arrays_when_asked() {
    let decoded = xml::decode(TOPICS_XML.as_bytes(), false).unwrap();
    let topics = decoded.get("topics").and_then(Value::as_list).unwrap();
    assert_eq!(topics.len(), 2);
}

#[test]
fn test_decode_yaml_element() {
    let document = "<config><settings type=\"yaml\">--- \nname: test\ncount: 3\n</settings></config>";

    let decoded = xml::decode(document.as_bytes(), true).unwrap();

    assert_eq!(
        decoded.get("settings"),
        Some(&Value::from_pairs([
            ("count", Value::Integer(3)),
            ("name", Value::from("test")),
        ]))
    );
}

#[test]
fn test_decode_file_and_binary_elements() {
    let document = r#"<upload>
  <avatar type="file" name="me.png" content_type="image/png">aGVsbG8=</avatar>
  <attachment type="file">aGVs
bG8=</attachment>
  <data type="base64Binary">aGVsbG8=</data>
</upload>"#;

    let decoded = xml::decode(document.as_bytes(), true).unwrap();

    assert_eq!(
        decoded.get("avatar"),
        Some(&Value::File(
            FileAttachment::new(b"hello".to_vec())
                .with_name("me.png")
                .with_content_type("image/png")
        ))
    );
    assert_eq!(
        decoded.get("attachment"),
        Some(&Value::File(FileAttachment::new(b"hello".to_vec())))
    );
    assert_eq!(decoded.get("data"), Some(&Value::Binary(b"hello".to_vec())));
}

#[test]
fn test_decode_unknown_type_is_structural() {
    let document = r#"<thing type="widget"><name>gear</name></thing>"#;

    let decoded = xml::decode(document.as_bytes(), true).unwrap();

    assert_eq!(
        decoded,
        Value::from_pairs([("type", Value::from("widget")), ("name", Value::from("gear"))])
    );
}

#[test]
fn test_decode_repeated_tags_merge_into_list() {
    let document = "<people><person><name>Matz</name></person><person><name>David</name></person></people>";

    let decoded = xml::decode(document.as_bytes(), true).unwrap();

    let people = decoded.get("person").and_then(Value::as_list).unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[1].get("name"), Some(&Value::from("David")));
}

#[test]
fn test_decode_invalid_typed_text_is_an_error() {
    let document = r#"<person><id type="integer">one</id></person>"#;
    assert!(xml::decode(document.as_bytes(), true).is_err());
}

#[test]
fn test_formats_decode_to_same_value() {
    let from_xml = Format::Xml
        .decode(br#"<person><id type="integer">1</id><name>Matz</name></person>"#)
        .unwrap();
    let from_json = Format::Json
        .decode(br#"{"person": {"id": 1, "name": "Matz"}}"#)
        .unwrap();

    assert_eq!(from_xml, from_json);
}

// ============================================================================
// Encoding
// ============================================================================

#[test]
fn test_encode_typed_values_decode_back() {
    let value = Value::from_pairs([
        ("born_on", Value::Date(NaiveDate::from_ymd_opt(1965, 4, 14).unwrap())),
        (
            "updated_at",
            Value::DateTime(DateTime::parse_from_rfc3339("2024-01-02T03:04:05+09:00").unwrap()),
        ),
        ("balance", Value::Decimal(Decimal::new(1050, 2))),
        ("active", Value::Bool(true)),
        ("nickname", Value::Null),
    ]);

    let encoded = xml::encode(&value, "person", XmlOptions::default()).unwrap();
    let decoded = xml::decode(&encoded, true).unwrap();

    assert_eq!(decoded, value);
}

#[test]
fn test_record_to_xml_with_nested_lists() {
    let (_http, _registry, person) = common::person(Format::Xml);
    let record = Record::new(
        &person,
        Value::from(json!({"friends": [{"name": "Joe"}], "tags": ["a", "b"]})),
    );

    let encoded = text(record.to_xml(None, plain()).unwrap());

    assert_eq!(
        encoded,
        "<person><friends type=\"array\"><friend><name>Joe</name></friend></friends>\
         <tags type=\"array\"><tag>a</tag><tag>b</tag></tags></person>"
    );
}

#[test]
fn test_record_to_json_with_nested_lists() {
    let (_http, _registry, person) = common::person(Format::Json);
    let record = Record::new(
        &person,
        Value::from(json!({"friends": [{"name": "Joe"}], "tags": ["a", "b"]})),
    );

    assert_eq!(
        text(record.to_json(None).unwrap()),
        r#"{"person":{"friends":[{"name":"Joe"}],"tags":["a","b"]}}"#
    );
    assert_eq!(
        text(record.to_json(Some("")).unwrap()),
        r#"{"friends":[{"name":"Joe"}],"tags":["a","b"]}"#
    );
}

#[test]
fn test_record_to_xml_dasherize_option() {
    let (_http, _registry, person) = common::person(Format::Xml);
    let record = Record::new(&person, Value::from(json!({"first_name": "Matz"})));

    assert_eq!(
        text(record.to_xml(None, plain()).unwrap()),
        "<person><first-name>Matz</first-name></person>"
    );
    let underscored = XmlOptions {
        dasherize: false,
        ..plain()
    };
    assert_eq!(
        text(record.to_xml(Some("human_being"), underscored).unwrap()),
        "<human_being><first_name>Matz</first_name></human_being>"
    );
}

#[test]
fn test_json_encode_with_and_without_root() {
    let mut map = Map::new();
    map.insert("id".to_string(), Value::Integer(1));
    let value = Value::Map(map);

    assert_eq!(text(json::encode(&value, "person").unwrap()), r#"{"person":{"id":1}}"#);
    assert_eq!(text(json::encode(&value, "").unwrap()), r#"{"id":1}"#);
}
