use clap::Parser;
use native_bridge::utils::logger;

#[derive(Parser)]
#[command(name = "memfd-secret")]
#[command(about = "Store a secret in memfd_secret(2) memory, issued as a raw syscall")]
struct Args {
    /// Override SYS_memfd_secret (447 on every Linux architecture)
    #[arg(long)]
    number: Option<i64>,

    #[arg(long, default_value = "p@ss123")]
    secret: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(target_os = "linux")]
fn main() {
    use native_bridge::core::secretmem::SecretRegion;
    use native_bridge::{DirectSystemCallInvoker, SyscallNumber};

    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let invoker = DirectSystemCallInvoker::new();
    let created = match args.number {
        // SAFETY: the operator asserts this is memfd_secret on the running kernel.
        Some(number) => unsafe {
            SecretRegion::create_with_number(&invoker, SyscallNumber::new(number), args.secret.len())
        },
        None => SecretRegion::create(&invoker, args.secret.len()),
    };
    let result = created.and_then(|mut region| {
        region.write(args.secret.as_bytes())?;
        Ok(String::from_utf8_lossy(region.as_bytes()).into_owned())
    });

    match result {
        Ok(read_back) => println!("Secret segment contained: {}", read_back),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);
    eprintln!("❌ memfd_secret only exists on Linux (requested syscall {:?})", args.number);
    std::process::exit(1);
}
