use std::net::SocketAddr;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use etsy_proxy::{cli, config, error, logging};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[clap(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    log_json: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the REST proxy (default)
    Serve(ServeOptions),

    /// Refresh the stored Etsy token
    Refresh,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ServeOptions {
    /// Address to bind, overrides SERVER_ADDRESS
    #[clap(long)]
    addr: Option<SocketAddr>,

    /// Open the Etsy login page in the default browser
    #[clap(long)]
    open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Command::Completions(opt)) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    logging::init(&cli.log_level, cli.log_json);

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let mut cfg = match config::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    match cli.command.unwrap_or(Command::Serve(ServeOptions::default())) {
        Command::Serve(opt) => {
            if let Some(addr) = opt.addr {
                cfg.server_addr = addr;
            }
            cli::serve(cfg, opt.open).await
        }
        Command::Refresh => cli::refresh(cfg).await,
        Command::Completions(_) => {}
    }
}
