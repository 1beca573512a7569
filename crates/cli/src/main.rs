mod github_api;
mod logging;

use clap::{Parser, Subcommand};
use lanekit_github_api::action::OWNING_TOOL;
use lanekit_github_api::metadata::github_api_info;
use lanekit_usage::{CollectorSettings, ToolCollector};
use owo_colors::OwoColorize as _;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lanekit", version, about = "Run lanekit actions from the command line")]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t)]
    log_format: logging::LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Call a GitHub API endpoint and print the result as JSON
    GithubApi(github_api::GithubApiArgs),
    /// Describe the available actions
    Actions {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let collector = ToolCollector::new(CollectorSettings::from_env());
    let code = match run(cli, &collector).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    };
    collector.did_finish();
    collector.wait_for_report();
    code
}

async fn run(cli: Cli, collector: &ToolCollector) -> anyhow::Result<()> {
    match cli.command {
        Command::GithubApi(args) => {
            collector.did_launch_action(OWNING_TOOL);
            let result = github_api::run(&args).await;
            if result.is_err() {
                collector.did_raise_error(OWNING_TOOL);
            }
            result
        }
        Command::Actions { json } => print_actions(json),
    }
}

fn print_actions(json: bool) -> anyhow::Result<()> {
    let info = github_api_info();
    if json {
        println!("{}", serde_json::to_string_pretty(&[&info])?);
        return Ok(());
    }

    println!("{} ({})", info.name.bold(), info.category);
    println!("  {}", info.description);
    println!();
    println!("  {}", "Options:".underline());
    for opt in &info.options {
        let env = opt
            .env_name
            .map(|e| format!(" [env: {e}]"))
            .unwrap_or_default();
        let default = opt
            .default_value
            .map(|d| format!(" (default: {d})"))
            .unwrap_or_default();
        println!(
            "    {:<12} {}{}{}",
            opt.key.cyan().to_string(),
            opt.description,
            default.dimmed(),
            env.dimmed()
        );
    }
    println!("  {}", "Outputs:".underline());
    for out in &info.outputs {
        println!("    {:<24} {}", out.key.cyan().to_string(), out.description);
    }
    Ok(())
}
