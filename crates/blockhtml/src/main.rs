use crate::prelude::*;
use clap::Parser;

mod error;
mod prelude;
mod render;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Render block-structured workspace documents to HTML"
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
    #[clap(long, env = "BLOCKHTML_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Render a block tree (JSON) to an HTML fragment or document
    Render(crate::render::RenderOptions),
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Render(options) => crate::render::run(options, app.global),
    }
}
