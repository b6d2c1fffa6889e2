// Copyright (c) Conforma contributors.
// Licensed under the MIT License.

/// Configuration errors: defects in the schema itself, not in the data
/// being coerced. Malformed runtime data never raises; coercion substitutes
/// fallback values instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    /// Empty or missing expression.
    #[error("empty expressions are not allowed")]
    EmptyExpression,
    /// A value that cannot be read as a type expression.
    #[error("invalid expression: {0}")]
    InvalidExpression(Box<str>),
    /// `enum`/`tags` declared without options.
    #[error("[type={0}] should have at least one option")]
    MissingOptions(Box<str>),
    /// `tuple` declared without items.
    #[error("[type=tuple] should have at least one item")]
    MissingItems,
    /// A registry entry bound to a bare sequence.
    #[error("type `{0}` defined as array")]
    TypeDefinedAsArray(Box<str>),
    /// An unresolvable `type` name.
    #[error("invalid type: {0}")]
    InvalidType(Box<str>),
    /// A union whose discriminant matched no branch and whose declared
    /// default matched none either.
    #[error("union branch not found: [{prop} / {default}]")]
    UnionBranchNotFound { prop: Box<str>, default: Box<str> },
    /// A type alias chain that reaches back into itself.
    #[error("alias cycle detected at type `{0}`")]
    AliasCycle(Box<str>),
}
