use anyhow::Context;
use clap::Parser;
use native_bridge::config::MODULE_PATH_ENV;
use native_bridge::core::CoordinateTransform;
use native_bridge::utils::{logger, validation};
use native_bridge::{BindMode, BindScope, Coordinate2D, DynamicSymbolBinder, LoadOptions};

#[derive(Parser)]
#[command(name = "bind-symbol")]
#[command(about = "Load a shared library and call one of its coordinate transforms")]
struct Args {
    /// Shared library to load
    #[arg(long, env = MODULE_PATH_ENV)]
    module: String,

    /// Exported `Coordinate2D -> Coordinate2D` function
    #[arg(long, default_value = "swap")]
    symbol: String,

    #[arg(long, value_enum, default_value_t = BindScope::Global)]
    scope: BindScope,

    #[arg(long, value_enum, default_value_t = BindMode::Now)]
    mode: BindMode,

    #[arg(short, long, default_value_t = 1.0, allow_hyphen_values = true)]
    x: f64,

    #[arg(short, long, default_value_t = 2.0, allow_hyphen_values = true)]
    y: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    validation::validate_path("--module", &args.module)?;
    validation::validate_symbol_name("--symbol", &args.symbol)?;

    let binder = DynamicSymbolBinder::new(LoadOptions {
        scope: args.scope,
        mode: args.mode,
    });

    let module = match binder.load(&args.module) {
        Ok(module) => module,
        Err(e) => {
            eprintln!("❌ can't load the lib: {}", e.reason);
            std::process::exit(1);
        }
    };

    // SAFETY: --symbol is documented to name a `Coordinate2D -> Coordinate2D` C function.
    let transform = unsafe { module.resolve::<CoordinateTransform>(&args.symbol) }
        .with_context(|| format!("binding {} in {}", args.symbol, module.origin()))?;

    let input = Coordinate2D::new(args.x, args.y);
    let output = transform.invoke((input,));

    tracing::debug!("{} returned {:?}", transform.name(), output);
    println!(
        "{}({}, {}) = ({}, {})",
        args.symbol, input.x, input.y, output.x, output.y
    );

    Ok(())
}
