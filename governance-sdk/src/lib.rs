//! Governance OApp Client SDK
//!
//! Typed client surface for the on-chain governance OApp and OFT programs
//! and for the slice of the LayerZero endpoint/ULN programs the admin
//! tooling consumes. Account layouts and instruction encodings are an
//! external contract defined by those programs; this crate is the single
//! place they are read and written, so the rest of the tooling never touches
//! raw bytes.

pub mod accounts;
pub mod governance;
pub mod instructions;
pub mod oft;
pub mod options;
pub mod pda;
pub mod plan;
pub mod uln;
pub mod util;

pub use governance::GovernanceClient;
pub use oft::OftClient;

/// LayerZero endpoint program id (identical on mainnet and testnet).
pub const DEFAULT_ENDPOINT_PROGRAM_ID: &str = "76y77prsiCMvXMjuoZ5VRrhG5qYBrUMYTE5WgHqgjEn6";

/// LayerZero ULN message library program id (identical on mainnet and testnet).
pub const DEFAULT_ULN_PROGRAM_ID: &str = "7a4WjyR8VZ7yZz5XJAKm39BUGn5iT9CKcv2pmG9tdXVH";
