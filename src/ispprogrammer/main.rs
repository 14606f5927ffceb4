use clap::{Parser, command};
use commands::{ConnectionOptions, MonitorOptions, SendOptions};
use ispprogrammer::error::IspResult;

mod commands;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Command {
    /// List serial ports on this machine
    #[command(name = "list", alias = "l")]
    List,

    /// Reset the target into its ISP bootloader
    #[command(name = "isp", alias = "i")]
    Isp(ConnectionOptions),

    /// Write a file to the target byte for byte
    #[command(name = "send", alias = "s")]
    Send(SendOptions),

    /// Print lines received from the target
    #[command(name = "monitor", alias = "m")]
    Monitor(MonitorOptions),
}

fn main() -> IspResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Command::List => commands::handle_list()?,
        Command::Isp(opts) => commands::handle_isp(opts)?,
        Command::Send(opts) => commands::handle_send(opts)?,
        Command::Monitor(opts) => commands::handle_monitor(opts)?,
    }

    Ok(())
}
