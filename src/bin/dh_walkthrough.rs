//! Walks through one Diffie-Hellman exchange on the command line.
//!
//! `RUST_LOG=debug cargo run --bin dh_walkthrough -- --prime 23 --generator 5`

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dh_demo::cs::security::{SessionObserver, SharedKeys};
use dh_demo::{ExchangeSession, Party};
use num_bigint::BigUint;

#[derive(Parser, Debug)]
#[command(about = "Toy Diffie-Hellman key exchange between Alice and Bob")]
struct Args {
    /// Prime modulus p
    #[arg(short, long, default_value = "23")]
    prime: String,

    /// Primitive root g modulo p
    #[arg(short, long, default_value = "5")]
    generator: String,

    /// Alice's secret exponent
    #[arg(long, default_value = "6")]
    alice: String,

    /// Bob's secret exponent
    #[arg(long, default_value = "15")]
    bob: String,

    /// Message Alice sends to Bob
    #[arg(short, long, default_value = "HI")]
    message: String,
}

struct Narrator;

impl SessionObserver for Narrator {
    fn on_public_value_published(&self, party: Party, public_value: &BigUint) {
        println!("  {} -> {}: {}", party, party.peer(), public_value);
    }

    fn on_shared_key_established(&self, keys: &SharedKeys) {
        println!("  Alice derives {}, Bob derives {}", keys.alice, keys.bob);
    }
}

fn run(args: &Args) -> dh_demo::Result<()> {
    let mut session = ExchangeSession::default();
    session.subscribe(Arc::new(Narrator));

    let validity = session.set_domain_parameters(&args.prime, &args.generator)?;
    println!("Domain parameters p = {}, g = {}", args.prime, args.generator);
    if !validity.p_valid {
        println!("  warning: p is not a prime");
    } else if !validity.g_valid {
        println!("  warning: g is not a primitive root of p");
    }

    println!("Publishing public values");
    session.publish_party_key(Party::Alice, &args.alice)?;
    session.publish_party_key(Party::Bob, &args.bob)?;

    let keys = session.on_both_published()?;
    println!("Shared key: {}", keys.alice);

    let cipher = session.encrypt(&args.message)?;
    println!("Encrypted {:?} -> {:?}", args.message, cipher);
    let plaintext = session.decrypt(&cipher)?;
    println!("Decrypted {:?} -> {:?}", cipher, plaintext);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::debug!("starting walkthrough with {:?}", args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("walkthrough failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
