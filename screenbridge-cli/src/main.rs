use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use screenbridge::client::{
    NegotiatorConfig, NoMedia, Participant, RelayClientConfig, SessionStatus, StaticVideoSource,
};
use screenbridge::model::{is_valid_code, normalize_code};
use screenbridge::server::{RelayConfig, serve};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screenbridge")]
#[command(about = "Peer-to-peer screen sharing paired by a short code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Relay {
        #[arg(long, env = "SCREENBRIDGE_BIND")]
        bind: Option<SocketAddr>,

        /// Seconds between expiry sweeps.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        sweep_secs: Option<u64>,

        /// Seconds a room may live.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        room_ttl_secs: Option<u64>,
    },

    /// Share this machine's screen and print the code to give out.
    Host {
        #[arg(long, env = "SCREENBRIDGE_RELAY", default_value = "ws://localhost:3000/ws")]
        relay: String,
    },

    /// Watch a shared screen.
    View {
        #[arg(long, env = "SCREENBRIDGE_RELAY", default_value = "ws://localhost:3000/ws")]
        relay: String,

        /// Sharing code; prompted for when omitted.
        code: Option<String>,

        /// Take control of the host once connected.
        #[arg(long)]
        control: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("screenbridge=info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay {
            bind,
            sweep_secs,
            room_ttl_secs,
        } => {
            let mut config = RelayConfig::from_env();
            if let Some(addr) = bind {
                config = config.bind(addr);
            }
            if let Some(secs) = sweep_secs {
                config = config.sweep_interval(Duration::from_secs(secs));
            }
            if let Some(secs) = room_ttl_secs {
                config = config.room_max_age(Duration::from_secs(secs));
            }

            println!(
                "{} {}",
                "Relay listening on".green().bold(),
                config.bind_addr
            );
            tokio::select! {
                result = serve(config) => result?,
                _ = tokio::signal::ctrl_c() => println!("{}", "Relay stopped".yellow()),
            }
        }

        Commands::Host { relay } => {
            let participant = Participant::start(
                RelayClientConfig::new(relay),
                Arc::new(StaticVideoSource::new()),
                NegotiatorConfig::default(),
            );
            drive(participant, Mode::Host).await;
        }

        Commands::View {
            relay,
            code,
            control,
        } => {
            let code = match code {
                Some(code) => normalize_code(&code),
                None => tokio::task::spawn_blocking(prompt_code)
                    .await
                    .context("Prompt task failed")??,
            };
            if !is_valid_code(&code) {
                anyhow::bail!("{} is not a sharing code", code);
            }

            let participant = Participant::start(
                RelayClientConfig::new(relay),
                Arc::new(NoMedia),
                NegotiatorConfig::default(),
            );
            drive(participant, Mode::View { code, control }).await;
        }
    }

    Ok(())
}

enum Mode {
    Host,
    View { code: String, control: bool },
}

fn prompt_code() -> Result<String> {
    let input: String = Input::new()
        .with_prompt("Sharing code")
        .validate_with(|input: &String| -> Result<(), &str> {
            if is_valid_code(&normalize_code(input)) {
                Ok(())
            } else {
                Err("expected nine digits, e.g. 123-456-789")
            }
        })
        .interact_text()?;
    Ok(normalize_code(&input))
}

/// Prints status until the user interrupts, rejoining after relay
/// reconnects.
async fn drive(mut participant: Participant, mode: Mode) {
    loop {
        tokio::select! {
            status = participant.status.recv() => {
                let Some(status) = status else { break };
                print_status(&status);

                match (&status, &mode) {
                    (SessionStatus::RelayConnected, Mode::Host) => {
                        participant.handle.request_code();
                    }
                    (SessionStatus::RelayConnected, Mode::View { code, .. }) => {
                        participant.handle.join(code.clone());
                    }
                    (SessionStatus::Connected, Mode::View { control: true, .. }) => {
                        participant.handle.enable_control();
                    }
                    _ => {}
                }
            }

            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Leaving...".yellow());
                break;
            }
        }
    }

    participant.shutdown().await;
}

fn print_status(status: &SessionStatus) {
    match status {
        SessionStatus::RelayConnected => println!("{}", "Connected to relay".cyan()),
        SessionStatus::CodeAssigned(code) => {
            println!("{} {}", "Your sharing code:".green().bold(), code.as_str().bold())
        }
        SessionStatus::Joined { .. } => println!("{}", "Joined, waiting for the host...".cyan()),
        SessionStatus::ViewerArrived { .. } => println!("{}", "A viewer joined".cyan()),
        SessionStatus::Connected => println!("{}", "Peer connection established".green()),
        SessionStatus::ControlEnabled => println!("{}", "Remote control enabled".green()),
        SessionStatus::ControlDisabled => println!("{}", "Remote control disabled".yellow()),
        SessionStatus::RoomExpired(code) => {
            println!("{} {}", "Room expired:".yellow(), code)
        }
        SessionStatus::Closed { reason } => println!("{} {}", "Session closed:".yellow(), reason),
        SessionStatus::Error(e) => println!("{} {}", "Error:".red().bold(), e),
    }
}
