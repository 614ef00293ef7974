use clap::Parser;
use native_bridge::core::upcall::sort_with_native_qsort;
use native_bridge::utils::logger;
use native_bridge::DynamicSymbolBinder;

#[derive(Parser)]
#[command(name = "qsort-upcall")]
#[command(about = "Sort integers with libc qsort calling back into a Rust comparator")]
struct Args {
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_value = "512,-3,77,0,2147483647,19,-2147483648,19,8"
    )]
    values: Vec<i32>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let mut args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let process = DynamicSymbolBinder::default().this_process()?;
    sort_with_native_qsort(&process, &mut args.values)?;

    println!("{:?}", args.values);
    Ok(())
}
