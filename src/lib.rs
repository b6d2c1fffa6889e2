// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod coerce;
mod error;
mod expr;
mod make;
mod number;
mod registry;
mod value;

pub use coerce::{
    coerce_bool, coerce_float, coerce_int, coerce_obj, coerce_str, try_bool, try_float, try_int,
    try_obj, try_str,
};
pub use error::SchemaError;
pub use expr::{Expr, HookFn, Kind, MakeFn, Param, Params, StructuredExpr, TransformFn};
pub use make::{make, make_value};
pub use number::Number;
pub use registry::{ConstructorFn, Registry, TypeDef};
pub use value::Value;
