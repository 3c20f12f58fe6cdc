//! Ledger access.
//!
//! [`LedgerGateway`] is the seam between the orchestrator and a ledger.
//! [`FullnodeClient`] implements it over the fullnode REST API, and
//! [`FaucetClient`] funds accounts on networks that have a faucet.

mod faucet;
mod fullnode;
mod gateway;
pub mod response;

pub use faucet::FaucetClient;
pub use fullnode::FullnodeClient;
pub use gateway::{LedgerGateway, TransactionStatus};
pub use response::{AccountData, AptosResponse, LedgerInfo, PendingTransaction, TransactionData};
