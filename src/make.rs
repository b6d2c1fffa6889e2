// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

//! The recursive type-expression evaluator.
//!
//! [`make`] resolves an expression against an input value and a registry of
//! custom types, producing a coerced, fully-defaulted output. Bad runtime
//! data never fails — every standard type is total over arbitrary input and
//! substitutes fallbacks. The only errors are configuration errors: defects
//! in the schema itself, raised immediately and propagated to the caller.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::coerce;
use crate::error::SchemaError;
use crate::expr::{Expr, HookFn, Kind, Param, StructuredExpr};
use crate::registry::{Registry, TypeDef};
use crate::value::Value;

/// Evaluate `expr` against `input`, producing a normalized value.
pub fn make(expr: &Expr, input: &Value, types: &Registry) -> Result<Value, SchemaError> {
    let mut chain = Vec::new();
    make_expr(expr, input, types, &mut chain)
}

/// Parse `expr` from structured data, then evaluate it.
pub fn make_value(expr: &Value, input: &Value, types: &Registry) -> Result<Value, SchemaError> {
    make(&Expr::from_value(expr)?, input, types)
}

fn apply_hook(hook: &Option<HookFn>, v: Value) -> Value {
    match hook {
        Some(f) => f(v),
        None => v,
    }
}

fn make_expr(
    expr: &Expr,
    input: &Value,
    types: &Registry,
    chain: &mut Vec<Rc<str>>,
) -> Result<Value, SchemaError> {
    match expr {
        Expr::Make(f) => f(input),
        Expr::Name(name) => {
            let expanded = StructuredExpr::of_name(name);
            make_typed(&expanded, input, types, chain)
        }
        Expr::Props(props) => props_output(props, &coerce::coerce_obj(input), types),
        Expr::Typed(e) => make_typed(e, input, types, chain),
    }
}

fn make_typed(
    expr: &StructuredExpr,
    input: &Value,
    types: &Registry,
    chain: &mut Vec<Rc<str>>,
) -> Result<Value, SchemaError> {
    // Nullable short-circuit: the constructor never runs, the hooks do.
    if expr.nullable && input.is_missing() {
        let v = apply_hook(&expr.before, Value::Null);
        return Ok(apply_hook(&expr.after, v));
    }

    // Custom kinds resolve through the registry before any hook fires;
    // alias resolution carries the merged hooks into the recursion instead.
    if let Kind::Custom(name) = &expr.kind {
        return make_custom(name, expr, input, types, chain);
    }

    let input = apply_hook(&expr.before, input.clone());
    let out = match &expr.kind {
        Kind::Raw => input.clone(),
        Kind::Any => make_any(&input, expr),
        Kind::Null => Value::Null,
        Kind::Const => expr.params().value("value"),
        Kind::Bool => make_bool(&input, expr),
        Kind::Int => make_int(&input, expr),
        Kind::Float => make_float(&input, expr),
        Kind::Str => make_str(&input, expr),
        Kind::Enum => make_enum(&input, expr)?,
        Kind::Array => make_array(&input, expr, types)?,
        Kind::Tuple => make_tuple(&input, expr, types)?,
        Kind::Tags => make_tags(&input, expr)?,
        Kind::Obj => make_obj(&input, expr, types)?,
        Kind::Union => make_union(&input, expr, types)?,
        Kind::Custom(_) => unreachable!("custom kinds are dispatched above"),
    };
    Ok(apply_hook(&expr.after, out))
}

fn make_custom(
    name: &Rc<str>,
    expr: &StructuredExpr,
    input: &Value,
    types: &Registry,
    chain: &mut Vec<Rc<str>>,
) -> Result<Value, SchemaError> {
    match types.get(name) {
        Some(TypeDef::Constructor(f)) => {
            let input = apply_hook(&expr.before, input.clone());
            let out = f(&input, expr, types)?;
            Ok(apply_hook(&expr.after, out))
        }
        Some(TypeDef::Alias(alias)) => {
            // Alias chains must terminate; a name reappearing in the active
            // resolution chain is a schema defect, not unbounded recursion.
            if chain.iter().any(|seen| seen == name) {
                return Err(SchemaError::AliasCycle(name.as_ref().into()));
            }
            chain.push(name.clone());
            let merged = expr.merge_alias(alias);
            let out = make_typed(&merged, input, types, chain);
            chain.pop();
            out
        }
        // Implicit obj definition; the referring expression's hooks do not
        // transfer to it.
        Some(TypeDef::Props(props)) => props_output(props, &coerce::coerce_obj(input), types),
        None => Err(SchemaError::InvalidType(name.as_ref().into())),
    }
}

// --- standard type library ---

fn make_any(input: &Value, expr: &StructuredExpr) -> Value {
    if input.is_undefined() {
        expr.params().value("default")
    } else {
        input.clone()
    }
}

fn make_bool(input: &Value, expr: &StructuredExpr) -> Value {
    match coerce::try_bool(input) {
        Some(b) => Value::Bool(b),
        None => Value::Bool(coerce::coerce_bool(&expr.params().value("default"), false)),
    }
}

fn make_int(input: &Value, expr: &StructuredExpr) -> Value {
    let p = expr.params();
    let min = coerce::coerce_int(&p.value("min"), i64::MIN, i64::MIN, i64::MAX);
    let max = coerce::coerce_int(&p.value("max"), i64::MAX, i64::MIN, i64::MAX);
    let out = coerce::try_int(input, min, max).unwrap_or_else(|| {
        let default = coerce::coerce_int(&p.value("default"), 0, i64::MIN, i64::MAX);
        default.min(max).max(min)
    });
    Value::from(out)
}

fn make_float(input: &Value, expr: &StructuredExpr) -> Value {
    let p = expr.params();
    let min = coerce::coerce_float(&p.value("min"), f64::MIN, f64::MIN, f64::MAX);
    let max = coerce::coerce_float(&p.value("max"), f64::MAX, f64::MIN, f64::MAX);
    let default = coerce::coerce_float(&p.value("default"), 0.0, f64::MIN, f64::MAX)
        .min(max)
        .max(min);
    Value::from(coerce::coerce_float(input, default, min, max))
}

fn make_str(input: &Value, expr: &StructuredExpr) -> Value {
    match coerce::try_str(input) {
        Some(s) => Value::String(s),
        None => Value::String(coerce::coerce_str(&expr.params().value("default"), "")),
    }
}

fn make_enum(input: &Value, expr: &StructuredExpr) -> Result<Value, SchemaError> {
    let p = expr.params();
    let options_value = p.value("options");
    let options = match options_value.as_array() {
        Ok(a) if !a.is_empty() => a,
        _ => return Err(SchemaError::MissingOptions("enum".into())),
    };

    let mut candidate = input.clone();
    match p.get("transform") {
        Some(Param::Transform(f)) => candidate = f(input),
        Some(Param::Value(Value::Object(map))) => {
            if let Some(key) = coerce::try_str(input) {
                if let Some(mapped) = map.get(key.as_ref()) {
                    candidate = mapped.clone();
                }
            }
        }
        _ => {}
    }

    if options.contains(&candidate) {
        return Ok(candidate);
    }
    if p.contains("default") {
        return Ok(p.value("default"));
    }
    Ok(options[0].clone())
}

fn make_array(
    input: &Value,
    expr: &StructuredExpr,
    types: &Registry,
) -> Result<Value, SchemaError> {
    let p = expr.params();
    let of = p.expr("of")?.unwrap_or_else(|| Expr::name("raw"));
    let min = coerce::coerce_int(&p.value("min"), 0, 0, i64::MAX) as usize;

    let mut out = match input {
        Value::Array(items) => items
            .iter()
            .map(|v| make(&of, v, types))
            .collect::<Result<Vec<_>, _>>()?,
        _ if min > 0 => vec![make(&of, input, types)?],
        _ => vec![],
    };
    while out.len() < min {
        out.push(make(&of, &Value::Null, types)?);
    }
    Ok(Value::from(out))
}

fn make_tuple(
    input: &Value,
    expr: &StructuredExpr,
    types: &Registry,
) -> Result<Value, SchemaError> {
    let items = match expr.params().items("items")? {
        Some(items) if !items.is_empty() => items,
        _ => return Err(SchemaError::MissingItems),
    };
    let out = items
        .iter()
        .enumerate()
        .map(|(i, item)| make(item, &input[i], types))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::from(out))
}

fn make_tags(input: &Value, expr: &StructuredExpr) -> Result<Value, SchemaError> {
    let options_value = expr.params().value("options");
    let options = options_value
        .as_array()
        .map_err(|_| SchemaError::MissingOptions("tags".into()))?;

    let mut out: Vec<Value> = vec![];
    if let Value::Array(items) = input {
        for item in items.iter() {
            if options.contains(item) && !out.contains(item) {
                out.push(item.clone());
            }
        }
    }
    Ok(Value::from(out))
}

fn make_obj(input: &Value, expr: &StructuredExpr, types: &Registry) -> Result<Value, SchemaError> {
    let p = expr.params();
    let source = match p.get("transform") {
        Some(Param::Transform(f)) => f(input),
        _ => coerce::coerce_obj(input),
    };
    let props = p.props("props")?.unwrap_or_default();
    props_output(&props, &source, types)
}

/// Evaluate each declared property against the same-named field of
/// `source`. All values are computed first; the output map becomes visible
/// only fully built.
fn props_output(
    props: &BTreeMap<Rc<str>, Expr>,
    source: &Value,
    types: &Registry,
) -> Result<Value, SchemaError> {
    let mut out = BTreeMap::new();
    for (key, prop) in props.iter() {
        let field = &source[key.as_ref()];
        // An optional property is omitted entirely when its source field is
        // absent; a present-but-null field still produces a (defaulted or
        // null) entry.
        if is_optional(prop) && field.is_undefined() {
            continue;
        }
        out.insert(key.clone(), make(prop, field, types)?);
    }
    Ok(Value::from(out))
}

fn is_optional(expr: &Expr) -> bool {
    matches!(expr, Expr::Typed(e) if e.optional)
}

fn make_union(
    input: &Value,
    expr: &StructuredExpr,
    types: &Registry,
) -> Result<Value, SchemaError> {
    let p = expr.params();
    let prop: Rc<str> = match coerce::try_str(&p.value("prop")) {
        Some(s) if !s.is_empty() => s,
        _ => "type".into(),
    };
    let branches = p.branches("options")?.unwrap_or_default();

    let mut tag = coerce::try_str(&input[prop.as_ref()]);
    let mut branch = tag.as_ref().and_then(|t| branches.get(t.as_ref()));
    if branch.is_none() {
        tag = coerce::try_str(&p.value("default"));
        branch = tag.as_ref().and_then(|t| branches.get(t.as_ref()));
    }
    let (tag, branch) = match (tag, branch) {
        (Some(tag), Some(branch)) => (tag, branch),
        _ => {
            return Err(SchemaError::UnionBranchNotFound {
                prop: prop.as_ref().into(),
                default: coerce::coerce_str(&p.value("default"), "<none>").as_ref().into(),
            })
        }
    };

    let mut out = BTreeMap::new();
    out.insert(prop, Value::String(tag));
    let fields = make(branch, input, types)?;
    if let Value::Object(m) = &fields {
        for (k, v) in m.iter() {
            out.insert(k.clone(), v.clone());
        }
    }
    Ok(Value::from(out))
}
