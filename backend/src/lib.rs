//! TM code generation for annotated C-minus programs.
//!
//! [`generate_code`] turns a [`frontend::ast::Program`] into TM assembler
//! text; [`generate_tm`] stops one step earlier and returns the
//! address-indexed [`tm::Code`].
extern crate frontend;
pub mod codegen;
pub mod error;
pub mod tm;

use frontend::ast;

pub use codegen::CodeGenerator;
pub use error::{CodegenError, CodegenResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodegenOptions {
  /// Interleave `*` comment lines and per-instruction remarks in the listing.
  pub trace: bool,
}

pub fn generate_tm(program: &ast::Program, options: &CodegenOptions) -> CodegenResult<tm::Code> {
  CodeGenerator::new(program, options).generate()
}

pub fn generate_code(program: &ast::Program, options: &CodegenOptions) -> CodegenResult<String> {
  let code = generate_tm(program, options)?;
  Ok(code.to_string())
}
