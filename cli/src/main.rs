mod commands;
mod credentials;
mod terminal;

use commands::session::Session;
use commands::{CommandLine, Commands, browse, lookup};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    let options = &commands.options;

    logging::init_logging(options.verbose, options.quiet);
    print::banner(options.quiet);

    let mut session = Session::open(commands.config(), options.user.clone());

    let result = match &commands.command {
        Commands::Domains => lookup::domains(&mut session).await,
        Commands::Members { workgroup } => lookup::members(&mut session, workgroup).await,
        Commands::Shares { host, target } => lookup::shares(&mut session, host, target).await,
        Commands::Info { host, target } => lookup::info(&mut session, host, target).await,
        Commands::Browse { watch, info } => browse::browse(&mut session, *watch, *info).await,
    };

    if result.is_ok() && options.quiet == 0 {
        print::end_of_program();
    }
    session.close().await;
    result
}
