use clap::Parser;
use native_bridge::utils::logger;
use native_bridge::utils::monitor::ProcessIdentity;
use native_bridge::{DirectSystemCallInvoker, DynamicSymbolBinder, SyscallArgs, SyscallNumber};

#[derive(Parser)]
#[command(name = "raw-syscall")]
#[command(about = "Issue one system call by number and print the raw result")]
struct Args {
    /// Syscall number for this host; the process-identifier call when omitted
    #[arg(long)]
    number: Option<i64>,

    /// Argument, repeatable, at most six
    #[arg(long = "arg", allow_hyphen_values = true)]
    args: Vec<i64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let invoker = DirectSystemCallInvoker::new();

    let Some(number) = args.number else {
        let pid = invoker.getpid()?;
        println!("pid: {}", pid);

        // 與 libc 的 getpid 及行程表交叉比對
        let process = DynamicSymbolBinder::default().this_process()?;
        // SAFETY: `pid_t getpid(void)`.
        let libc_getpid = unsafe { process.resolve::<unsafe extern "C" fn() -> i32>("getpid") }?;
        println!("libc getpid: {}", libc_getpid.invoke(()));

        if let Some(identity) = ProcessIdentity::current() {
            identity.log();
            anyhow::ensure!(identity.matches(pid), "process table reports pid {}", identity.pid);
        }
        return Ok(());
    };

    let Some(syscall_args) = SyscallArgs::from_slice(&args.args) else {
        anyhow::bail!("at most six syscall arguments, got {}", args.args.len());
    };

    // SAFETY: the operator supplies both number and arguments on the command line.
    match unsafe { invoker.call(SyscallNumber::new(number), syscall_args) } {
        Ok(result) => {
            println!("syscall {} = {}", number, result);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(3);
        }
    }
}
