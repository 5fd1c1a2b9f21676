//! Nameforge - proof-of-work name registry tooling
//!
//! Single binary with subcommands:
//!   nameforge difficulty <name> [--base <bits>]   - required work for a name
//!   nameforge mine <name> <owner> <miner> [--bits <n>] - search for a proof
//!   nameforge verify <name> <owner> <miner> <nonce> <bits> - check a proof

use anyhow::{anyhow, bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::time::Duration;

use nameforge::difficulty::{charset_weight, length_weight, MIN_BASE_BITS};
use nameforge::proof::{ProofVerifier, Sha3Verifier};
use nameforge::{difficulty_bits, target_from_bits, Identity, Name};

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("difficulty") => cmd_difficulty(&args[1..]),
        Some("mine") => cmd_mine(&args[1..]),
        Some("verify") => cmd_verify(&args[1..]),
        Some("--version") | Some("-V") => {
            println!("nameforge {}", nameforge::VERSION);
            Ok(())
        }
        Some("--help") | Some("-h") | None => {
            print_help();
            Ok(())
        }
        Some(other) => Err(anyhow!("unknown command: {other}")),
    };

    if let Err(e) = result {
        eprintln!("{} {e:#}", style("error:").red().bold());
        std::process::exit(1);
    }
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}

fn print_help() {
    println!("nameforge {} - proof-of-work name registry tooling", nameforge::VERSION);
    println!();
    println!("Usage:");
    println!("  nameforge difficulty <name> [--base <bits>]");
    println!("      Show the required difficulty and target for a name");
    println!("  nameforge mine <name> <owner> <miner> [--bits <n>]");
    println!("      Search for a proof nonce (owner/miner: 0x-hex identity,");
    println!("      or any label to derive one deterministically)");
    println!("  nameforge verify <name> <owner> <miner> <nonce> <bits>");
    println!("      Check a previously found nonce");
    println!();
    println!("Environment:");
    println!("  RUST_LOG   log filter (default: warn)");
}

/// Parse an identity: 0x-hex form, or derived from an arbitrary label
fn parse_identity(s: &str) -> Identity {
    Identity::from_hex(s).unwrap_or_else(|_| Identity::derive(s.as_bytes()))
}

/// Pull a `--flag <value>` pair out of the argument list
fn flag_value(args: &[String], flag: &str) -> Result<Option<u32>> {
    match args.iter().position(|a| a == flag) {
        None => Ok(None),
        Some(i) => {
            let raw = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("{flag} requires a value"))?;
            let parsed = raw.parse().with_context(|| format!("invalid {flag} value {raw}"))?;
            Ok(Some(parsed))
        }
    }
}

fn cmd_difficulty(args: &[String]) -> Result<()> {
    let raw = args.first().ok_or_else(|| anyhow!("usage: difficulty <name> [--base <bits>]"))?;
    let name = Name::parse(raw)?;
    let base = flag_value(args, "--base")?.unwrap_or(MIN_BASE_BITS);

    let bits = difficulty_bits(&name, base);
    let target = target_from_bits(bits);

    println!("name:           {name}");
    println!("base bits:      {base}");
    println!("length weight:  +{}", length_weight(name.len()));
    println!("charset weight: +{}", charset_weight(&name));
    println!("required bits:  {}", style(bits).bold());
    println!("target:         {target}");
    Ok(())
}

fn cmd_mine(args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("usage: mine <name> <owner> <miner> [--bits <n>]");
    }
    let name = Name::parse(&args[0])?;
    let owner = parse_identity(&args[1]);
    let miner = parse_identity(&args[2]);
    let bits = match flag_value(args, "--bits")? {
        Some(b) => b,
        None => difficulty_bits(&name, MIN_BASE_BITS),
    };
    let target = target_from_bits(bits);

    println!("mining {name} at {bits} bits for owner {owner}");

    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(100));

    let verifier = Sha3Verifier;
    let mut nonce: u64 = rand::thread_rng().gen();
    let mut tried: u64 = 0;
    loop {
        let (valid, digest) = verifier.verify(&name, &owner, &miner, nonce, &target);
        if valid {
            bar.finish_and_clear();
            println!("{} after {tried} attempts", style("proof found").green().bold());
            println!("nonce:  {nonce}");
            println!("digest: {digest}");
            println!("target: {target}");
            return Ok(());
        }
        nonce = nonce.wrapping_add(1);
        tried += 1;
        if tried % 65_536 == 0 {
            bar.set_message(format!("{tried} hashes"));
        }
    }
}

fn cmd_verify(args: &[String]) -> Result<()> {
    if args.len() != 5 {
        bail!("usage: verify <name> <owner> <miner> <nonce> <bits>");
    }
    let name = Name::parse(&args[0])?;
    let owner = parse_identity(&args[1]);
    let miner = parse_identity(&args[2]);
    let nonce: u64 = args[3].parse().context("invalid nonce")?;
    let bits: u32 = args[4].parse().context("invalid bits")?;
    let target = target_from_bits(bits);

    let (valid, digest) = Sha3Verifier.verify(&name, &owner, &miner, nonce, &target);
    println!("digest: {digest}");
    println!("target: {target}");
    if valid {
        println!("{}", style("valid proof").green().bold());
        Ok(())
    } else {
        bail!("digest does not meet target");
    }
}
