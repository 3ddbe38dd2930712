use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use backend::{generate_code, CodegenOptions};
use frontend::ast::Program;
use tracing::{debug, info};

pub const USAGE: &str = "\
Usage: tmgen [options] <program.json>

Reads an annotated C-minus program (JSON) and writes TM assembly.

Options:
  -o <file>      Write the listing to <file> (default: input with .tm extension)
  -t, --trace    Annotate the listing with trace comments
  -h, --help     Show this help
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
  pub input: PathBuf,
  pub output: Option<PathBuf>,
  pub trace: bool,
}

impl DriverOptions {
  pub fn output_path(&self) -> PathBuf {
    match &self.output {
      Some(path) => path.clone(),
      None => self.input.with_extension("tm"),
    }
  }

  pub fn codegen(&self) -> CodegenOptions {
    CodegenOptions { trace: self.trace }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Compile(DriverOptions),
  Help,
}

/// Parses the arguments after the program name.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command> {
  let mut args = args.into_iter();
  let mut input = None;
  let mut output = None;
  let mut trace = false;

  while let Some(arg) = args.next() {
    match arg.as_str() {
      "-h" | "--help" => return Ok(Command::Help),
      "-t" | "--trace" => trace = true,
      "-o" => match args.next() {
        Some(path) => output = Some(PathBuf::from(path)),
        None => bail!("-o expects a file name"),
      },
      flag if flag.starts_with('-') => bail!("unknown option `{}`", flag),
      path => {
        if input.is_some() {
          bail!("only one input file may be given");
        }
        input = Some(PathBuf::from(path));
      }
    }
  }

  match input {
    Some(input) => Ok(Command::Compile(DriverOptions {
      input,
      output,
      trace,
    })),
    None => bail!("no input file"),
  }
}

pub fn load_program(path: &Path) -> Result<Program> {
  let contents =
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
  serde_json::from_str(&contents)
    .with_context(|| format!("{} is not an annotated program", path.display()))
}

pub fn compile_program(program: &Program, options: &CodegenOptions) -> Result<String> {
  generate_code(program, options).context("code generation failed")
}

/// Compiles `options.input` and returns the path the listing was written to.
pub fn compile_file(options: &DriverOptions) -> Result<PathBuf> {
  let program = load_program(&options.input)?;
  debug!(
    functions = program.functions.len(),
    declarations = program.declarations.len(),
    "program loaded"
  );

  let listing = compile_program(&program, &options.codegen())?;
  let output = options.output_path();
  fs::write(&output, listing).with_context(|| format!("writing {}", output.display()))?;
  info!(
    input = %options.input.display(),
    output = %output.display(),
    "compiled"
  );
  Ok(output)
}
