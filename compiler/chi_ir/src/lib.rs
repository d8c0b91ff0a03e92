//! Chi IR: the data every stage of the pipeline shares.
//!
//! - [`Name`] and [`SymbolTable`]: interned symbols, compared by code
//! - [`Span`]: byte ranges for diagnostics
//! - [`ast`]: the syntax tree, with resolution slots the analyzer fills in
//! - [`visitor`]: read-only traversal helpers

pub mod ast;
mod name;
mod span;
mod symbols;
pub mod visitor;

pub use ast::{
    Apply, Binding, CallTarget, Definition, Expr, ExprKind, Identifier, Location, Module,
    ModuleKind, Program, ScopeId,
};
pub use name::Name;
pub use span::Span;
pub use symbols::{SharedSymbols, Symbol, SymbolTable, UnknownSymbol, WellKnownNames, NULL_TEXT};

pub use rust_decimal::Decimal;
