// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

//! Builds a table-column configuration from partial UI input.
//!
//! Demonstrates the three registry definition shapes working together: a
//! stateful `uid` constructor that mints identifiers for rows arriving
//! without one, a `columns` alias over `array`, and a `column` object type
//! whose `before` hook folds the shared `class` field into `class_th` /
//! `class_td` and derives `key` and `component_td`.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use conforma::{coerce_str, make, Expr, Kind, Param, Registry, StructuredExpr, Value};

#[derive(Parser)]
#[command(name = "table-columns")]
#[command(about = "Normalize a partial table-column list into a full configuration")]
struct Cli {
    /// JSON file with the raw column list; built-in samples when omitted.
    input: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input = match &cli.input {
        Some(path) => Value::from_json_file(path)?,
        None => sample_columns()?,
    };
    let columns = make(&Expr::name("columns"), &input, &column_registry())?;
    println!("{}", columns.to_json_str()?);
    Ok(())
}

fn sample_columns() -> Result<Value> {
    let samples = json!([
        {"label": "", "component": "page-banner-sizes-star-td", "class": "c"},
        {"label": "Size", "class": "c", "class_td": "fw5 color-black"},
        {"label": "Tag", "component": "page-banner-sizes-tag-td", "class": "c"},
        {"label": "Title", "component": "page-banner-sizes-title-td"},
        {"label": "Updated", "class": "r nowrap"},
        {"label": "", "component": "page-banner-sizes-popover"},
    ]);
    Ok(serde_json::from_value(samples)?)
}

fn column_registry() -> Registry {
    let mut registry = Registry::new();

    // {type: "uid", prefix: "col_"} — returns the trimmed input string, or
    // mints "{prefix}a{n}" from a monotonic counter when input is blank.
    let next_uid = Cell::new(1u64);
    registry.constructor("uid", move |input, expr, types| {
        let s = make(&Expr::name("str"), input, types)?;
        let trimmed = s.as_string().map(|v| v.trim().to_string()).unwrap_or_default();
        if !trimmed.is_empty() {
            return Ok(Value::from(trimmed));
        }
        let prefix = coerce_str(&expr.params().value("prefix"), "");
        let n = next_uid.get();
        next_uid.set(n + 1);
        Ok(Value::from(format!("{prefix}a{n}")))
    });

    registry.define(
        "columns",
        StructuredExpr::new(Kind::Array)
            .param("of", Expr::name("column"))
            .into_expr(),
    );

    let mut props: BTreeMap<Rc<str>, Expr> = BTreeMap::new();
    props.insert("key".into(), Expr::name("uid"));
    props.insert("label".into(), Expr::name("str"));
    props.insert("class_th".into(), nullable_str());
    props.insert("class_td".into(), nullable_str());
    props.insert("slot".into(), nullable_str());
    props.insert("component".into(), nullable_str());
    props.insert("component_td".into(), nullable_str());

    registry.define(
        "column",
        StructuredExpr::new(Kind::Obj)
            .param("props", Param::props(props))
            .before(rewrite_column)
            .into_expr(),
    );

    registry
}

fn nullable_str() -> Expr {
    StructuredExpr::new(Kind::Str).nullable().into_expr()
}

// Derives key from label, folds the shared `class` into `class_th` and
// `class_td`, and reuses a `-td` component as the cell component.
fn rewrite_column(input: Value) -> Value {
    let field = |k: &str| coerce_str(&input[k], "");
    let key = field("key");
    let label = field("label");
    let class = field("class");
    let class_th = field("class_th");
    let class_td = field("class_td");
    let component = field("component");
    let component_td = field("component_td");

    let mut out = match &input {
        Value::Object(m) => (**m).clone(),
        _ => BTreeMap::new(),
    };
    out.insert(
        "key".into(),
        Value::from(if key.is_empty() { label.to_string() } else { key.to_string() }),
    );
    out.insert("label".into(), Value::from(label.to_string()));
    out.insert(
        "component_td".into(),
        if !component_td.is_empty() {
            Value::from(component_td.to_string())
        } else if component.ends_with("-td") {
            Value::from(component.to_string())
        } else {
            Value::Null
        },
    );
    out.insert("class_th".into(), joined_class(&class, &class_th));
    out.insert("class_td".into(), joined_class(&class, &class_td));
    Value::from(out)
}

fn joined_class(class: &str, extra: &str) -> Value {
    let joined = format!("{class} {extra}");
    let joined = joined.trim();
    if joined.is_empty() {
        Value::Null
    } else {
        Value::from(joined)
    }
}
