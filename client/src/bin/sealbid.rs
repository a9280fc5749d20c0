//! Command-line companion for sealed-bid auctions.
//!
//! Computes commitments for bidders, renders phase ids, and runs scripted auctions.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use commonware_utils::{from_hex_formatted, hex};
use sealbid_client::{PhaseView, Scenario};
use sealbid_execution::commitment::{parse_digest_hex, verify, SealedBid};
use sealbid_types::{Phase, MAX_SECRET_LENGTH};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sealed-bid auction tooling")]
struct Args {
    #[arg(long, default_value = "info", global = true)]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the commitment to publish while bidding is open.
    Commit {
        #[arg(long)]
        amount: u64,
        /// Opening secret; a random one is generated when omitted.
        #[arg(long)]
        secret: Option<String>,
    },
    /// Check an opening against a published commitment.
    Verify {
        #[arg(long)]
        digest: String,
        #[arg(long)]
        amount: u64,
        #[arg(long, required_unless_present = "secret_hex")]
        secret: Option<String>,
        /// Secret as printed by `commit`.
        #[arg(long, conflicts_with = "secret")]
        secret_hex: Option<String>,
    },
    /// Show the label and progress for a phase id.
    Phase {
        #[arg(long)]
        id: u8,
    },
    /// Run a scripted auction from a YAML file and print the report as JSON.
    Simulate {
        #[arg(long)]
        scenario: PathBuf,
        /// Abort on the first refused step.
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Serialize)]
struct CommitOutput {
    digest: String,
    amount: u64,
    /// Hex of the secret to keep until the reveal phase.
    secret: String,
}

#[derive(Serialize)]
struct VerifyOutput {
    valid: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Commit { amount, secret } => {
            let sealed = match secret {
                Some(secret) => SealedBid::new(amount, secret.into_bytes(), MAX_SECRET_LENGTH)
                    .context("Secret cannot be revealed")?,
                None => SealedBid::generate(&mut rand::thread_rng(), amount),
            };
            print_json(&CommitOutput {
                digest: hex(sealed.digest().as_ref()),
                amount,
                secret: hex(&sealed.secret),
            })
        }
        Command::Verify {
            digest,
            amount,
            secret,
            secret_hex,
        } => {
            let digest = parse_digest_hex(&digest).context("Invalid digest")?;
            let secret = match (secret, secret_hex) {
                (Some(secret), _) => secret.into_bytes(),
                (None, Some(encoded)) => from_hex_formatted(&encoded)
                    .ok_or_else(|| anyhow!("Invalid secret hex"))?,
                (None, None) => return Err(anyhow!("Provide --secret or --secret-hex")),
            };
            print_json(&VerifyOutput {
                valid: verify(&digest, amount, &secret),
            })
        }
        Command::Phase { id } => {
            let phase = Phase::try_from(id).map_err(|_| anyhow!("Unknown phase id: {id}"))?;
            print_json(&PhaseView::from(phase))
        }
        Command::Simulate { scenario, strict } => {
            let source = std::fs::read_to_string(&scenario)
                .with_context(|| format!("Failed to read {}", scenario.display()))?;
            let script = Scenario::from_yaml(&source).context("Failed to parse scenario")?;
            info!(
                bidders = script.bidders.len(),
                steps = script.steps.len(),
                "running scenario"
            );
            let report = script.run(strict).context("Scenario aborted")?;
            print_json(&report)
        }
    }
}
