//! Standalone frontend binary.
//!
//! Usage:
//!   cargo run -p snek_client -- [--addr localhost:6969] [--path /] [--frame-hz 2]
//!                               [--config client.json] [--dump-result]
//!
//! The client connects to a Snek server, reads the world metadata, then
//! decodes one frame per server message until the game-over sentinel and
//! the final score arrive.

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use snek_client::{client::exit_code_for, Presenter, SnekClient, TraceRenderer};
use snek_shared::config::ClientConfig;
use tracing::{error, info, warn};

#[derive(Debug, Default, PartialEq)]
struct Args {
    config_path: Option<String>,
    addr: Option<String>,
    path: Option<String>,
    frame_hz: Option<f32>,
    dump_result: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(argv: I) -> Args {
    let args: Vec<String> = argv.into_iter().collect();
    let mut out = Args::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                out.addr = Some(args[i + 1].clone());
                i += 2;
            }
            "--path" if i + 1 < args.len() => {
                out.path = Some(args[i + 1].clone());
                i += 2;
            }
            "--frame-hz" if i + 1 < args.len() => {
                out.frame_hz = args[i + 1].parse().ok();
                i += 2;
            }
            "--config" if i + 1 < args.len() => {
                out.config_path = Some(args[i + 1].clone());
                i += 2;
            }
            "--dump-result" => {
                out.dump_result = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    out
}

fn load_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut cfg = match &args.config_path {
        Some(path) => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("read config {path}"))?;
            ClientConfig::from_json_str(&text).with_context(|| format!("parse config {path}"))?
        }
        None => ClientConfig::default(),
    };
    if let Some(addr) = &args.addr {
        cfg.server_addr = addr.clone();
    }
    if let Some(path) = &args.path {
        cfg.ws_path = path.clone();
    }
    if let Some(hz) = args.frame_hz {
        cfg.frame_hz = hz;
    }
    Ok(cfg)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    info!(server = %cfg.server_addr, frame_hz = cfg.frame_hz, "Starting Snek3D frontend");

    let mut client = SnekClient::connect(&cfg).await?;
    let mut presenter = Presenter::new(TraceRenderer::default(), cfg.frame_interval());
    let summary = presenter.run(&mut client).await?;

    match summary.final_score {
        Some(score) => println!("Game over. Score: {score}"),
        None => println!("Game over."),
    }
    let (source, _) = client.into_parts();
    if let Err(e) = source.close().await {
        warn!(error = %e, "Close handshake failed");
    }
    if args.dump_result {
        println!("{}", summary.to_json().context("serialize summary")?);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args(env::args());
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Session aborted: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}
