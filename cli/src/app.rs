//! CLI assembly: read the alarm, apply command overrides and run the handler.
use std::io::Read;
use std::sync::Arc;

use aic_core::api as core_api;
use aic_core::trace::{TraceLimits, TracePalette};
use serde_json::Value;

use crate::commands::cli::{Args, Commands};

pub fn build_emitter(cfg: &core_api::AppConfig) -> core_api::TraceEmitter {
    let colored = cfg.trace.color.resolve(atty::is(atty::Stream::Stderr));
    core_api::TraceEmitter::new(
        Arc::new(core_api::TracingSink),
        TracePalette::with_enabled(colored),
        TraceLimits::from(&cfg.trace),
    )
}

/// Reads an alarm event from a file, or stdin for `-`.
pub fn read_event(source: &str) -> Result<Value, core_api::CliError> {
    let raw = if source == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s)?;
        s
    } else {
        std::fs::read_to_string(source)?
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Config for this invocation with command-line overrides applied.
pub fn effective_config(cfg: &core_api::AppConfig, command: &Commands) -> core_api::AppConfig {
    let mut cfg = cfg.clone();
    if let Commands::Replay(r) = command {
        cfg.runtime = core_api::RuntimeConfig::Replay(core_api::ReplayRuntimeConfig {
            events_file: r.events.clone(),
        });
    }
    cfg
}

pub fn exit_code_for_response(resp: &core_api::HandlerResponse) -> i32 {
    if resp.is_success() {
        0
    } else {
        1
    }
}

#[tracing::instrument(name = "cli.run_app", skip(args, ctx))]
pub async fn run_app_with_config(
    args: Args,
    ctx: &core_api::AppContext,
) -> Result<i32, core_api::CliError> {
    let event = match &args.command {
        Commands::Invoke(a) => read_event(&a.event)?,
        Commands::Replay(r) => match &r.event {
            Some(src) => read_event(src)?,
            None => Value::Object(Default::default()),
        },
    };
    let ctx = ctx.with_config(effective_config(ctx.cfg(), &args.command));

    let resp = core_api::handle_event(&ctx, event).await;
    let out = if args.compact {
        serde_json::to_string(&resp)?
    } else {
        serde_json::to_string_pretty(&resp)?
    };
    println!("{out}");
    Ok(exit_code_for_response(&resp))
}
