//! Entrypoint for CLI
mod app;
mod error;
mod inputmap;
mod term;

use std::{env, error::Error};

use chip8::{Hz, IMPL_VERSION};
use log::{error, LevelFilter};

use self::{
    app::{Chip8App, Options},
    error::AppError,
};

/// Upper bound for `--hz`. Anything faster is indistinguishable from unthrottled.
const MAX_CLOCK_FREQUENCY: u64 = 1_000_000;

static USAGE: &str = r#"
usage: chip8 ROM [OPTIONS]

options:
    --hz N          Instructions executed per second (default 700)
    --frames N      Stop after N frames at 60 frames per second
    --headless      Run without the terminal display, then print the final screen

keys:
    1 2 3 4         1 2 3 C
    q w e r         4 5 6 D
    a s d f    ->   7 8 9 E
    z x c v         A 0 B F

    esc             quit

examples:
    chip8 breakout.ch8
    chip8 maze.ch8 --headless --frames 120
"#;

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()?;

    let opts = match parse_args(env::args().skip(1)) {
        Ok(Some(opts)) => opts,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{}", err.kind);
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    let mut app = Chip8App::new(opts);

    if let Err(err) = app.load_rom().and_then(|_| app.run()) {
        error!("{err}");
        std::process::exit(1);
    }

    Ok(())
}

/// Parse command line arguments. Returns `None` when help was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Options>, AppError> {
    let mut filepath = None;
    let mut opts = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--hz" => {
                let hz = consume_number(&mut args, "--hz")?;
                if hz == 0 || hz > MAX_CLOCK_FREQUENCY {
                    return Err(AppError::usage(format!(
                        "--hz must be between 1 and {MAX_CLOCK_FREQUENCY}"
                    )));
                }
                opts.clock_frequency = Some(Hz(hz));
            }
            "--frames" => opts.frames = Some(consume_number(&mut args, "--frames")?),
            "--headless" => opts.headless = true,
            flag if flag.starts_with('-') => {
                return Err(AppError::usage(format!("unknown option {flag}")))
            }
            _ if filepath.is_none() => filepath = Some(arg),
            _ => return Err(AppError::usage(format!("unexpected argument {arg}"))),
        }
    }

    opts.filepath = filepath.ok_or_else(|| AppError::usage("missing ROM file"))?;

    Ok(Some(opts))
}

/// Consumes the next argument as a number.
fn consume_number(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u64, AppError> {
    let arg = args
        .next()
        .ok_or_else(|| AppError::usage(format!("{flag} expects a value")))?;

    arg.parse()
        .map_err(|_| AppError::usage(format!("{flag} expects a number, got {arg}")))
}

fn print_usage() {
    println!("Chip8 v{IMPL_VERSION}");
    println!("{USAGE}");
}
