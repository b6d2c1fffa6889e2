// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use conforma::*;

#[test]
fn serialize_number() -> Result<()> {
    // Check that integer values are serialized without fractional part
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.0))?, "1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.0))?, "-1");

    // Ensure that fractional parts are also serialized.
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.1))?, "1.1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.1))?, "-1.1");

    // Non-finite numbers have no JSON notation.
    assert_eq!(serde_json::to_string(&Value::from(f64::NAN))?, "null");
    assert_eq!(serde_json::to_string(&Value::from(f64::INFINITY))?, "null");

    Ok(())
}

#[test]
fn serialize_undefined() -> Result<()> {
    let mut obj = Value::new_object();
    obj.as_object_mut()?.insert("a".into(), Value::Undefined);
    assert_eq!(obj.to_json_str()?, "{\n  \"a\": \"<undefined>\"\n}");
    Ok(())
}

#[test]
fn serialize_string() -> Result<()> {
    assert_eq!(
        Value::String("Hello, World\n".into()).to_json_str()?,
        "\"Hello, World\\n\""
    );
    Ok(())
}

#[test]
fn parse_big_integers() -> Result<()> {
    // Wider than u64/i64: preserved exactly, not rounded through f64.
    let v = Value::from_json_str("123456789012345678901234567890")?;
    assert!(v.as_number()?.is_big());
    assert_eq!(
        serde_json::to_string(&v)?,
        "123456789012345678901234567890"
    );

    let v = Value::from_json_str("-123456789012345678901234567890")?;
    assert!(v.as_number()?.is_big());
    assert_eq!(
        serde_json::to_string(&v)?,
        "-123456789012345678901234567890"
    );
    Ok(())
}

#[test]
fn constructors() -> Result<()> {
    assert_eq!(Value::new_object(), Value::from_json_str("{}")?);
    assert_eq!(Value::new_array(), Value::from_json_str("[]")?);
    Ok(())
}

#[test]
fn string_as_index() -> Result<()> {
    let obj = Value::from_json_str(r#"{ "a" : 5, "b" : 6 }"#)?;
    assert_eq!(&obj["a"], &Value::from(5.0));
    assert_eq!(&obj["c"], &Value::Undefined);

    // Non-indexable values answer every lookup with undefined.
    assert_eq!(&Value::Null["a"], &Value::Undefined);
    assert_eq!(&Value::Undefined["a"], &Value::Undefined);
    assert_eq!(&Value::Bool(true)["a"], &Value::Undefined);
    assert_eq!(&Value::String("Hello".into())["a"], &Value::Undefined);
    Ok(())
}

#[test]
fn usize_as_index() -> Result<()> {
    assert_eq!(&Value::from_json_str("[1, 2, 3]")?[0], &Value::from(1.0));
    assert_eq!(&Value::from_json_str("[1, 2, 3]")?[5], &Value::Undefined);
    assert_eq!(&Value::Null[0], &Value::Undefined);
    Ok(())
}

#[test]
fn missing_classification() {
    assert!(Value::Null.is_missing());
    assert!(Value::Undefined.is_missing());
    assert!(!Value::Bool(false).is_missing());
    assert!(!Value::from(f64::NAN).is_missing());
    assert!(Value::from(f64::NAN).is_nan());
    assert!(!Value::from(0.0).is_nan());
}

#[test]
fn api() -> Result<()> {
    assert!(&Value::from_json_str("{}")?.as_object()?.is_empty());
    let mut v = Value::new_object();
    v.as_object_mut()?.insert("a".into(), Value::from(3.145));
    assert_eq!(v["a"], Value::from(3.145));
    assert_eq!(v.as_object()?.len(), 1);

    // Check invalid api calls.
    assert!(Value::Undefined.as_object().is_err());
    assert!(Value::Undefined.as_object_mut().is_err());

    assert!(Value::String("anc".into()).as_array().is_err());
    assert!(Value::String("anc".into()).as_array_mut().is_err());

    assert!(Value::new_object().as_number().is_err());
    assert!(Value::from(5.6).as_bool().is_err());
    assert!(Value::from(5.6).as_string().is_err());
    Ok(())
}

#[test]
fn numeric_equality_across_widths() -> Result<()> {
    assert_eq!(Value::from(2002u64), Value::from(2002i64));
    assert_eq!(Value::from(2002u64), Value::from(2002.0));
    assert_eq!(Value::from_json_str("2002")?, Value::from(2002i64));
    assert_ne!(Value::from(2002u64), Value::from(2002.5));
    Ok(())
}
