//! Funds two fresh devnet accounts and moves 1000 octas between them.
//!
//! ```bash
//! RUST_LOG=aptos_transfer=debug cargo run -p aptos-transfer --example transfer
//! ```

use anyhow::Result;
use aptos_transfer::account::Ed25519Account;
use aptos_transfer::api::{FaucetClient, FullnodeClient};
use aptos_transfer::config::{AptosConfig, TransactionOptions};
use aptos_transfer::poll::PollConfig;
use aptos_transfer::{AccountAddress, TransferOrchestrator};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

async fn print_balances(
    orchestrator: &TransferOrchestrator,
    accounts: [(&str, AccountAddress); 2],
) -> Result<()> {
    for (name, address) in accounts {
        match orchestrator.account_balance(address).await? {
            Some(balance) => println!("{name}: {balance}"),
            None => println!("{name}: no balance"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = AptosConfig::devnet();
    let faucet = FaucetClient::new(&config)?;
    let orchestrator = TransferOrchestrator::new(
        Arc::new(FullnodeClient::new(config)?),
        TransactionOptions::default(),
        PollConfig::default(),
    );

    let a = Ed25519Account::generate();
    let b = Ed25519Account::generate();
    println!("\n=== Addresses ===");
    println!("A: {}", a.address());
    println!("B: {}", b.address());

    orchestrator.fund_account(&faucet, a.address(), 20_000).await?;
    orchestrator.fund_account(&faucet, b.address(), 0).await?;

    println!("\n=== Initial Balances ===");
    print_balances(&orchestrator, [("A", a.address()), ("B", b.address())]).await?;

    let outcome = orchestrator.execute_transfer(&a, b.address(), 1_000).await?;
    println!("\nTxn Hash: {}", outcome.hash);
    println!(
        "Committed at version {} (success: {}, gas used: {})",
        outcome.version, outcome.success, outcome.gas_used
    );

    println!("\n=== Final Balances ===");
    print_balances(&orchestrator, [("A", a.address()), ("B", b.address())]).await?;

    Ok(())
}
