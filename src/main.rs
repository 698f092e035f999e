use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use trove::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head` or `grep -q` panics on a broken pipe.
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

    // Logs go to stderr so they never mix with table or JSON output
    let filter = if global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("TROVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    match cli.command {
        Commands::Init(args) => trove::cli::commands::init::run(args),
        Commands::Org(cmd) => trove::cli::commands::org::run(cmd, &global),
        Commands::Lib(cmd) => trove::cli::commands::library::run(cmd, &global),
        Commands::Completions(args) => trove::cli::commands::completions::run(args),
    }
}
