//! Annotated syntax tree and symbol tables produced by the C-minus front end.
//!
//! Parsing and semantic analysis happen upstream; this crate only defines the
//! data they hand to the code generator.
pub mod ast;

pub use ast::symtab::{FunSymbol, Scopes, SymbolError, SymbolTable, VarScope, VarSymbol, VarType};
pub use ast::{BinaryOp, FunctionDecl, Node, Program, Type};
