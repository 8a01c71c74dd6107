use clap::{Args, Subcommand};

use crate::config;

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand, Clone)]
enum ConfigSubcommand {
    /// Validate the config file, or a single profile in it.
    Check {
        #[arg(long)]
        profile: Option<String>,
    },
    /// Print the settings read from the environment.
    Show,
}

pub fn run(args: ConfigArgs) -> Result<(), String> {
    match args.command {
        ConfigSubcommand::Check { profile } => {
            let path = config::validate_config(profile.as_deref())?;
            println!("config OK: {}", path.display());
            Ok(())
        }
        ConfigSubcommand::Show => {
            let settings = config::settings();
            println!("debug: {}", if settings.debug { "on" } else { "off" });
            Ok(())
        }
    }
}
