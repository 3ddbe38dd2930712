use driver::{compile_file, parse_args, Command, USAGE};

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let options = match parse_args(std::env::args().skip(1)) {
    Ok(Command::Compile(options)) => options,
    Ok(Command::Help) => {
      print!("{}", USAGE);
      return Ok(());
    }
    Err(e) => {
      eprintln!("{}\n\n{}", e, USAGE);
      std::process::exit(2);
    }
  };

  compile_file(&options)?;
  Ok(())
}
