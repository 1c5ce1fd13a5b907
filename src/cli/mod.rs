pub mod run;

use crate::cli::run::RunWorkload;
use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};

/// `Handler` is a trait that should be implemented for each of our subcommands.
///
/// It defines the contract & the input / output of a subcommand execution.
#[async_trait]
pub trait Handler {
    /// Executes the subcommand handler.
    ///
    /// Every subcommand should take no argument, as it is built at runtime with the arguments using Clap.
    /// Also, a subcommand must always return a `Result<()>`.
    async fn handler(&self) -> Result<()>;
}

/// The enumeration of our subcommands.
///
/// Each of our subcommands should be listed in this enumeration with the following format :
/// CommandName(CommandHandler)
#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunWorkload),
}

#[derive(Parser, Debug)]
#[clap(version, author)]
pub struct CommandLineInterface {
    /// The subcommand to apply
    #[clap(subcommand)]
    pub command: Command,
}

impl CommandLineInterface {
    pub fn command(self) -> Box<dyn Handler> {
        match self.command {
            Command::Run(handler) => Box::new(handler),
        }
    }
}
