//! zbx-to-cachet - create, acknowledge and resolve Cachet incidents from alert actions.

use anyhow::Result;
use zbx_cachet::cli::Cli;
use zbx_cachet::config::init_logging;
use zbx_cachet::BridgeError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug_enabled())?;

    if let Err(err) = cli.run().await {
        match err.downcast_ref::<BridgeError>() {
            Some(bridge_err) => {
                eprintln!("{}", bridge_err.user_message());
                std::process::exit(bridge_err.exit_code());
            }
            None => {
                eprintln!("[!] {:#}", err);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
