use thiserror::Error;

/// Failures of the code generator.
///
/// Every variant is fatal. Input is assumed to have passed semantic analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
  #[error("backpatch at {address} is beyond the highest emitted location {high_water}")]
  Backpatch { address: usize, high_water: usize },

  #[error("no translation for {kind} in {context}")]
  UnexpectedNode {
    kind: &'static str,
    context: &'static str,
  },

  #[error("unknown variable `{0}`")]
  UnknownVariable(String),

  #[error("unknown function `{0}`")]
  UnknownFunction(String),

  #[error("function `{0}` is called before its body is generated")]
  UnresolvedFunction(String),

  #[error("function `{0}` is defined more than once")]
  DuplicateFunction(String),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
