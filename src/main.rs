use clap::Parser;
use hdp::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`hdp status | head`).
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.quiet, global.verbose)?;

    match cli.command {
        Commands::Init(args) => hdp::cli::commands::init::run(args),
        Commands::Import(args) => hdp::cli::commands::import::run(args, &global),
        Commands::Audit(args) => hdp::cli::commands::audit::run(args, &global),
        Commands::Status(args) => hdp::cli::commands::status::run(args, &global),
        Commands::Completions(args) => hdp::cli::commands::completions::run(args),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("HDP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| miette::miette!("failed to initialize logging: {}", e))
}
