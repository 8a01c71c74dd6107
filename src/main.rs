use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use jobhunt::commands::ask::{self, AskArgs, BUILD_VERSION};
use jobhunt::commands::config::{self, ConfigArgs};
use jobhunt::logging;
use owo_colors::OwoColorize;

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  jobhunt ask --provider anthropic \"Summarise this job posting\"\n  echo \"Who is hiring Rust engineers?\" | jobhunt ask --provider perplexity\n  jobhunt config check\n  jobhunt completion bash > ~/.local/share/bash-completion/completions/jobhunt";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  jobhunt ask --provider openai --model gpt-4-turbo \"2+2?\"\n  jobhunt ask --provider anthropic --image posting.png \"Extract the salary range\"\n  jobhunt ask --provider perplexity --dry-run --json \"Latest Rust job boards\"";

#[derive(Debug, Parser)]
#[command(
    name = "jobhunt",
    version = BUILD_VERSION,
    about = "Chat-completion helpers for OpenAI, Anthropic and Perplexity",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Ask a question to an LLM provider", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// `--verbose`/`--quiet` as given to `ask`; other commands log at the default level.
    fn log_flags(&self) -> (bool, bool) {
        match self {
            Self::Ask(args) => (args.verbose, args.quiet),
            Self::Config(_) | Self::Completion { .. } => (false, false),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let (verbose, quiet) = cli.command.log_flags();
    logging::init(verbose, quiet);

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            generate(shell, &mut Cli::command(), "jobhunt", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red().bold());
        process::exit(1);
    }
}
