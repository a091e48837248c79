use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use bmp_grayscale::pipeline;


#[derive(Parser)]
#[command(version, about = "Convert a 24-bit BMP image to grayscale")]
struct Args {
    /// Bitmap to read
    #[arg(allow_hyphen_values = true)]
    input: PathBuf,

    /// Where to save the grayscale bitmap
    #[arg(allow_hyphen_values = true)]
    output: PathBuf,

    // anything after the two paths is accepted and ignored
    #[arg(num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    _rest: Vec<OsString>
}

fn convert(args: &Args) -> anyhow::Result<()> {
    pipeline::run(&args.input, &args.output)
        .with_context(|| format!("converting {} to {}", args.input.display(), args.output.display()))?;
    println!("Done! Saved as {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            let program = std::env::args().next().unwrap_or_else(|| "bmp-grayscale".to_string());
            println!("Usage: {program} <input_file.bmp> <output_file.bmp>");
            return ExitCode::FAILURE;
        }
    };

    match convert(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
