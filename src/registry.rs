// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

//! Caller-owned registry of named custom types.
//!
//! A definition has one of three shapes, resolved once at registration:
//! a constructor function, an alias to another type with parameter
//! overrides, or a bare property map that behaves as an implicit `obj`.
//! The registry is read-only during evaluation. A constructor closure may
//! capture external mutable state (a uid counter, say); the registry does
//! no locking, so callers invoking the evaluator from several threads must
//! serialize access to such constructors themselves.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::SchemaError;
use crate::expr::{Expr, StructuredExpr};
use crate::value::Value;

/// Registry-bound constructor: receives the input value, the invoking
/// expression (for access to its params), and the registry itself so it can
/// call back into the evaluator.
pub type ConstructorFn =
    Rc<dyn Fn(&Value, &StructuredExpr, &Registry) -> Result<Value, SchemaError>>;

/// A named custom type definition.
#[derive(Clone)]
pub enum TypeDef {
    /// Constructor function.
    Constructor(ConstructorFn),
    /// Alias: another type name plus parameter overrides.
    Alias(Rc<StructuredExpr>),
    /// Implicit `obj`: a bare property map.
    Props(Rc<BTreeMap<Rc<str>, Expr>>),
}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDef::Constructor(_) => f.write_str("Constructor(<fn>)"),
            TypeDef::Alias(e) => write!(f, "Alias({e:?})"),
            TypeDef::Props(p) => write!(f, "Props({:?})", p.keys().collect::<Vec<_>>()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: BTreeMap<Rc<str>, TypeDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn insert(&mut self, name: &str, def: TypeDef) -> &mut Self {
        self.types.insert(name.into(), def);
        self
    }

    /// Register a constructor function.
    pub fn constructor(
        &mut self,
        name: &str,
        f: impl Fn(&Value, &StructuredExpr, &Registry) -> Result<Value, SchemaError> + 'static,
    ) -> &mut Self {
        self.insert(name, TypeDef::Constructor(Rc::new(f)))
    }

    /// Register a definition from an expression: a structured expression
    /// becomes an alias, a property map an implicit `obj`, a name an alias
    /// of that name, a bare function a constructor.
    pub fn define(&mut self, name: &str, expr: Expr) -> &mut Self {
        let def = match expr {
            Expr::Typed(e) => TypeDef::Alias(e),
            Expr::Props(p) => TypeDef::Props(p),
            Expr::Name(alias) => {
                TypeDef::Alias(Rc::new(StructuredExpr::of_name(alias.as_ref())))
            }
            Expr::Make(f) => {
                TypeDef::Constructor(Rc::new(move |input, _, _| f(input)))
            }
        };
        self.insert(name, def)
    }

    /// Build a registry from a data object of definitions. A definition
    /// bound to a bare sequence is a schema-authoring mistake and is
    /// rejected here, at the earliest point the defect is visible.
    pub fn from_value(v: &Value) -> Result<Registry, SchemaError> {
        let mut registry = Registry::new();
        let defs = match v {
            Value::Object(m) => m,
            _ => {
                return Err(SchemaError::InvalidExpression(
                    format!("registry must be an object, got {v}").into(),
                ))
            }
        };
        for (name, def) in defs.iter() {
            if matches!(def, Value::Array(_)) {
                return Err(SchemaError::TypeDefinedAsArray(name.as_ref().into()));
            }
            registry.define(name.as_ref(), Expr::from_value(def)?);
        }
        Ok(registry)
    }

    pub fn from_json_str(s: &str) -> Result<Registry, SchemaError> {
        let v = Value::from_json_str(s)
            .map_err(|e| SchemaError::InvalidExpression(e.to_string().into()))?;
        Registry::from_value(&v)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }
}
