/*
    Module that bundles transaction building:
        - Unspent outputs and the keys that spend them
        - Inputs, outputs and the transaction itself
        - Sighash flags and the BIP143 digest
        - Raw transaction parsing
*/

mod reader;
pub mod sighash;
pub mod txid;
pub mod unspent;
pub mod input;
pub mod output;
pub mod transaction;

pub use sighash::SigHash;
pub use txid::Txid;
pub use unspent::Unspent;
pub use input::{TxInput, DEFAULT_SEQUENCE};
pub use output::TxOutput;
pub use transaction::Transaction;
