use crate::prelude::*;
use clap::Parser;

mod client;
mod error;
mod prelude;
mod relay;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate academic paper introductions from a five-field outline"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "INTROGEN_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Run the relay between form clients and the Gemini API
    Serve(crate::relay::App),

    /// Fill in the outline and generate an introduction through the relay
    Generate(crate::client::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Serve(sub_app) => crate::relay::run(sub_app, app.global).await,
        SubCommands::Generate(sub_app) => crate::client::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
