//! `parley` binary entry point.

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, info_span, Instrument};

use parley::cli::errors::format_error_help;
use parley::cli::{Cli, Commands};
use parley::config::ParleyConfig;
use parley::demo::{
    console_sink, hello_world, inter_agent, render_catalog, DeliveryMode, DemoContext,
    InterAgentOptions,
};
use parley::error::ParleyError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    parley::logging::init(cli.global.verbose);

    if let Err(e) = run(cli).await {
        let message = match e.downcast_ref::<ParleyError>() {
            Some(err) => format_error_help(err),
            None => format!("{e:#}"),
        };
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if matches!(cli.command, Commands::List) {
        print!("{}", render_catalog());
        return Ok(());
    }

    let settings = cli.global.resolve_settings()?;
    let working_dir = cli.global.resolve_working_dir()?;
    let config = ParleyConfig::from_env();
    let ctx = DemoContext::from_config(&config, settings, working_dir)?;

    let service_id = ctx.settings().service_id.clone().unwrap_or_default();
    let span = info_span!("demo", service_id = %service_id, model = ctx.provider().model_id());
    info!(parent: &span, working_dir = %ctx.working_dir().display(), "starting demo");

    let (mode, args) = match cli.command {
        Commands::List => return Ok(()),
        Commands::HelloWorld(args) => {
            hello_world::run(&ctx, args.quick, Some(console_sink()))
                .instrument(span)
                .await?;
            return Ok(());
        }
        Commands::InterAgent(args) => (DeliveryMode::ReceiveTool, args),
        Commands::SimpleCommunication(args) => (DeliveryMode::Direct, args),
    };

    let mut timing = ctx.settings().demo.clone();
    args.apply(&mut timing);
    let options = InterAgentOptions::from_timing(&timing, mode);

    let report = inter_agent::run(&ctx, options, Some(console_sink()))
        .instrument(span)
        .await?;

    if !report.is_success() {
        let failed: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.id, f.error))
            .collect();
        bail!("agent conversation failed ({})", failed.join("; "));
    }
    Ok(())
}
