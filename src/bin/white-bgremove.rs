//! White background removal CLI tool
//!
//! Turns near-white backgrounds transparent and writes RGBA PNGs.

#[cfg(feature = "cli")]
use white_bgremove::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
