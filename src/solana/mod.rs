pub mod rpc_client;
pub mod swap;
pub mod types;

pub use rpc_client::SolanaRpcClient;
pub use swap::{extract_swap_fill, SwapFill};
