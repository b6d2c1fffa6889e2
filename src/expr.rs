// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

//! Type expressions.
//!
//! A schema node is structured data, not code: callers either build it with
//! the fluent API here or parse it from a JSON-shaped [`Value`] with
//! [`Expr::from_value`]. Parsing resolves the shorthand forms once — a bare
//! name, a bare property map, and the `type`-wrapped-in-array escape hatch
//! all become explicit variants, so evaluation never sniffs for key absence.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::coerce;
use crate::error::SchemaError;
use crate::value::Value;

/// A bare constructor used directly as an expression; receives the input
/// value only.
pub type MakeFn = Rc<dyn Fn(&Value) -> Result<Value, SchemaError>>;

/// `before`/`after` pipeline stage.
pub type HookFn = Rc<dyn Fn(Value) -> Value>;

/// Input transform for `enum` and `obj`.
pub type TransformFn = Rc<dyn Fn(&Value) -> Value>;

/// The standard type kinds, closed, plus the open extension point for
/// registry-defined names. Dispatch is a `match`, never a string lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    Raw,
    Any,
    Null,
    Const,
    Bool,
    Int,
    Float,
    Str,
    Enum,
    Array,
    Tuple,
    Tags,
    Obj,
    Union,
    Custom(Rc<str>),
}

impl Kind {
    pub fn from_name(name: &str) -> Kind {
        match name {
            "raw" => Kind::Raw,
            "any" => Kind::Any,
            "null" => Kind::Null,
            "const" => Kind::Const,
            "bool" => Kind::Bool,
            "int" => Kind::Int,
            "float" => Kind::Float,
            "str" => Kind::Str,
            "enum" => Kind::Enum,
            "array" => Kind::Array,
            "tuple" => Kind::Tuple,
            "tags" => Kind::Tags,
            "obj" => Kind::Obj,
            "union" => Kind::Union,
            _ => Kind::Custom(name.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Kind::Raw => "raw",
            Kind::Any => "any",
            Kind::Null => "null",
            Kind::Const => "const",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Enum => "enum",
            Kind::Array => "array",
            Kind::Tuple => "tuple",
            Kind::Tags => "tags",
            Kind::Obj => "obj",
            Kind::Union => "union",
            Kind::Custom(name) => name,
        }
    }
}

/// One entry of a structured expression's option bag.
#[derive(Clone)]
pub enum Param {
    /// Plain data: `min`, `max`, `default`, `value`, `options`, `prop`, a
    /// transform lookup map, ...
    Value(Value),
    /// A nested expression (`array.of`).
    Expr(Expr),
    /// Positional expressions (`tuple.items`).
    Items(Rc<Vec<Expr>>),
    /// Named property expressions (`obj.props`).
    Props(Rc<BTreeMap<Rc<str>, Expr>>),
    /// Discriminated branches (`union.options`).
    Branches(Rc<BTreeMap<Rc<str>, Expr>>),
    /// A transform function (`enum.transform`, `obj.transform`).
    Transform(TransformFn),
}

impl Param {
    pub fn props(map: BTreeMap<Rc<str>, Expr>) -> Param {
        Param::Props(Rc::new(map))
    }

    pub fn branches(map: BTreeMap<Rc<str>, Expr>) -> Param {
        Param::Branches(Rc::new(map))
    }
}

impl From<Value> for Param {
    fn from(v: Value) -> Self {
        Param::Value(v)
    }
}

impl From<Expr> for Param {
    fn from(e: Expr) -> Self {
        Param::Expr(e)
    }
}

impl From<Vec<Expr>> for Param {
    fn from(items: Vec<Expr>) -> Self {
        Param::Items(Rc::new(items))
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(v) => write!(f, "Value({v:?})"),
            Param::Expr(e) => write!(f, "Expr({e:?})"),
            Param::Items(items) => write!(f, "Items({items:?})"),
            Param::Props(p) => write!(f, "Props({:?})", p.keys().collect::<Vec<_>>()),
            Param::Branches(b) => write!(f, "Branches({:?})", b.keys().collect::<Vec<_>>()),
            Param::Transform(_) => f.write_str("Transform(<fn>)"),
        }
    }
}

/// Type-specific option bag. Accessors are lenient: a `Param::Value` payload
/// asked for as an expression/items/branches is interpreted on demand, so
/// alias-merged bags behave like the plain maps they came from.
#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: BTreeMap<Rc<str>, Param>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, param: Param) {
        self.entries.insert(key.into(), param);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.entries.get(key)
    }

    /// Plain data param; `Undefined` when absent or not data.
    pub fn value(&self, key: &str) -> Value {
        match self.entries.get(key) {
            Some(Param::Value(v)) => v.clone(),
            _ => Value::Undefined,
        }
    }

    /// Nested expression param.
    pub fn expr(&self, key: &str) -> Result<Option<Expr>, SchemaError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Param::Expr(e)) => Ok(Some(e.clone())),
            Some(Param::Props(p)) => Ok(Some(Expr::Props(p.clone()))),
            Some(Param::Value(v)) if !v.is_missing() => Expr::from_value(v).map(Some),
            Some(_) => Ok(None),
        }
    }

    /// Positional expressions param.
    pub fn items(&self, key: &str) -> Result<Option<Rc<Vec<Expr>>>, SchemaError> {
        match self.entries.get(key) {
            Some(Param::Items(items)) => Ok(Some(items.clone())),
            Some(Param::Value(Value::Array(a))) => {
                let items = a.iter().map(Expr::from_value).collect::<Result<_, _>>()?;
                Ok(Some(Rc::new(items)))
            }
            _ => Ok(None),
        }
    }

    /// Named property expressions param.
    pub fn props(&self, key: &str) -> Result<Option<Rc<BTreeMap<Rc<str>, Expr>>>, SchemaError> {
        match self.entries.get(key) {
            Some(Param::Props(p)) => Ok(Some(p.clone())),
            Some(Param::Expr(Expr::Props(p))) => Ok(Some(p.clone())),
            Some(Param::Value(Value::Object(m))) => Ok(Some(Rc::new(parse_prop_map(m)?))),
            _ => Ok(None),
        }
    }

    /// Discriminated branch expressions param.
    pub fn branches(&self, key: &str) -> Result<Option<Rc<BTreeMap<Rc<str>, Expr>>>, SchemaError> {
        match self.entries.get(key) {
            Some(Param::Branches(b)) => Ok(Some(b.clone())),
            Some(Param::Props(p)) | Some(Param::Expr(Expr::Props(p))) => Ok(Some(p.clone())),
            Some(Param::Value(Value::Object(m))) => Ok(Some(Rc::new(parse_prop_map(m)?))),
            _ => Ok(None),
        }
    }

    /// Entries of `self` override same-named entries of `base`; this is the
    /// left-biased half of alias resolution.
    pub(crate) fn merge_over(&self, base: &Params) -> Params {
        let mut entries = base.entries.clone();
        for (k, v) in self.entries.iter() {
            entries.insert(k.clone(), v.clone());
        }
        Params { entries }
    }
}

fn parse_prop_map(m: &BTreeMap<Rc<str>, Value>) -> Result<BTreeMap<Rc<str>, Expr>, SchemaError> {
    m.iter()
        .map(|(k, v)| Ok((k.clone(), Expr::from_value(v)?)))
        .collect()
}

/// A structured expression: dispatch kind, option bag, the `nullable` and
/// `optional` flags, and the optional pre/post pipeline stages.
#[derive(Clone)]
pub struct StructuredExpr {
    pub(crate) kind: Kind,
    pub(crate) nullable: bool,
    pub(crate) optional: bool,
    pub(crate) before: Option<HookFn>,
    pub(crate) after: Option<HookFn>,
    pub(crate) params: Params,
}

impl StructuredExpr {
    pub fn new(kind: Kind) -> Self {
        StructuredExpr {
            kind,
            nullable: false,
            optional: false,
            before: None,
            after: None,
            params: Params::new(),
        }
    }

    pub fn of_name(name: &str) -> Self {
        Self::new(Kind::from_name(name))
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn param(mut self, key: &str, param: impl Into<Param>) -> Self {
        self.params.insert(key, param.into());
        self
    }

    pub fn transform(mut self, f: impl Fn(&Value) -> Value + 'static) -> Self {
        self.params.insert("transform", Param::Transform(Rc::new(f)));
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn before(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.before = Some(Rc::new(f));
        self
    }

    pub fn after(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.after = Some(Rc::new(f));
        self
    }

    pub fn into_expr(self) -> Expr {
        Expr::Typed(Rc::new(self))
    }

    /// Resolve `self` (the invoking expression) against an alias definition:
    /// the dispatch kind comes from the alias (right-biased on `type`), the
    /// invoking expression's params override the alias's same-named params
    /// (left-biased), and its flags/hooks win when set.
    pub(crate) fn merge_alias(&self, alias: &StructuredExpr) -> StructuredExpr {
        StructuredExpr {
            kind: alias.kind.clone(),
            nullable: self.nullable || alias.nullable,
            optional: self.optional || alias.optional,
            before: self.before.clone().or_else(|| alias.before.clone()),
            after: self.after.clone().or_else(|| alias.after.clone()),
            params: self.params.merge_over(&alias.params),
        }
    }
}

impl fmt::Debug for StructuredExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredExpr")
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("optional", &self.optional)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl From<StructuredExpr> for Expr {
    fn from(e: StructuredExpr) -> Self {
        Expr::Typed(Rc::new(e))
    }
}

/// A type expression.
#[derive(Clone)]
pub enum Expr {
    /// Bare name, shorthand for a structured expression with that kind.
    Name(Rc<str>),
    /// Bare property map, shorthand for `obj` with those props.
    Props(Rc<BTreeMap<Rc<str>, Expr>>),
    /// Structured expression.
    Typed(Rc<StructuredExpr>),
    /// Bare constructor function.
    Make(MakeFn),
}

impl Expr {
    pub fn name(name: &str) -> Expr {
        Expr::Name(name.into())
    }

    pub fn props<I>(props: I) -> Expr
    where
        I: IntoIterator<Item = (Rc<str>, Expr)>,
    {
        Expr::Props(Rc::new(props.into_iter().collect()))
    }

    pub fn make(f: impl Fn(&Value) -> Result<Value, SchemaError> + 'static) -> Expr {
        Expr::Make(Rc::new(f))
    }

    /// Parse a schema node from structured data, resolving the shorthand
    /// forms into explicit variants.
    pub fn from_value(v: &Value) -> Result<Expr, SchemaError> {
        match v {
            Value::Null | Value::Undefined => Err(SchemaError::EmptyExpression),
            Value::String(s) => Ok(Expr::Name(s.clone())),
            Value::Object(map) => match map.get("type") {
                // No `type` key: the whole map is an obj property set.
                None => Ok(Expr::Props(Rc::new(parse_prop_map(map)?))),
                // `type` wrapped in an array: the escape hatch that lets a
                // schema keep a literal property named `type`.
                Some(Value::Array(wrapped)) => {
                    let mut props = BTreeMap::new();
                    for (k, pv) in map.iter() {
                        if k.as_ref() == "type" {
                            let unwrapped = wrapped.first().cloned().unwrap_or(Value::Undefined);
                            props.insert(k.clone(), Expr::from_value(&unwrapped)?);
                        } else {
                            props.insert(k.clone(), Expr::from_value(pv)?);
                        }
                    }
                    Ok(Expr::Props(Rc::new(props)))
                }
                Some(Value::String(name)) => {
                    let kind = Kind::from_name(name);
                    let mut expr = StructuredExpr::new(kind.clone());
                    for (k, pv) in map.iter() {
                        match k.as_ref() {
                            "type" => {}
                            "nullable" => expr.nullable = coerce::coerce_bool(pv, false),
                            "optional" => expr.optional = coerce::coerce_bool(pv, false),
                            _ => {
                                let param = parse_param(&kind, k.as_ref(), pv)?;
                                expr.params.insert(k.as_ref(), param);
                            }
                        }
                    }
                    Ok(Expr::Typed(Rc::new(expr)))
                }
                Some(other) => Err(SchemaError::InvalidExpression(
                    format!("`type` must be a string, got {other}").into(),
                )),
            },
            other => Err(SchemaError::InvalidExpression(
                format!("not a type expression: {other}").into(),
            )),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Expr, SchemaError> {
        let v = Value::from_json_str(s)
            .map_err(|e| SchemaError::InvalidExpression(e.to_string().into()))?;
        Expr::from_value(&v)
    }
}

/// Kind-aware param parsing: nested expressions are resolved eagerly where
/// the kind declares them; everything else stays plain data and is
/// interpreted lazily by the [`Params`] accessors.
fn parse_param(kind: &Kind, key: &str, v: &Value) -> Result<Param, SchemaError> {
    match (kind, key) {
        (Kind::Array, "of") => Ok(Param::Expr(Expr::from_value(v)?)),
        (Kind::Tuple, "items") => match v {
            Value::Array(a) => {
                let items = a.iter().map(Expr::from_value).collect::<Result<_, _>>()?;
                Ok(Param::Items(Rc::new(items)))
            }
            _ => Ok(Param::Value(v.clone())),
        },
        (Kind::Obj, "props") => match v {
            Value::Object(m) => Ok(Param::Props(Rc::new(parse_prop_map(m)?))),
            _ => Ok(Param::Value(v.clone())),
        },
        (Kind::Union, "options") => match v {
            Value::Object(m) => Ok(Param::Branches(Rc::new(parse_prop_map(m)?))),
            _ => Ok(Param::Value(v.clone())),
        },
        _ => Ok(Param::Value(v.clone())),
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::Name(name.into())
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Name(s) => write!(f, "Name({s:?})"),
            Expr::Props(p) => write!(f, "Props({:?})", p.keys().collect::<Vec<_>>()),
            Expr::Typed(t) => write!(f, "Typed({t:?})"),
            Expr::Make(_) => f.write_str("Make(<fn>)"),
        }
    }
}
