//! x402 NFT mint gate HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with default config (config.toml in current directory)
//! cargo run -p mintgate-server --release
//!
//! # Run with custom config path
//! CONFIG=/path/to/config.toml cargo run -p mintgate-server
//!
//! # Configure logging level
//! RUST_LOG=info cargo run -p mintgate-server
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` — Path to TOML configuration file (default: `config.toml`)
//! - `HOST` — Override bind address (default: `0.0.0.0`)
//! - `PORT` — Override port (default: `4030`)
//! - `RUST_LOG` — Log level filter (default: `info`)
//! - Secrets referenced by `$VAR` in the config file, typically
//!   `OWNER_PRIVATE_KEY` and `TREASURY_ADDRESS`

use std::net::SocketAddr;
use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::reqwest::Url;
use axum::http::Method;
use mintgate::gate::{DEFAULT_RESOURCE, MintGate};
use mintgate_evm::{EvmMinter, EvmPaymentVerifier};
use tower_http::cors;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mintgate_server::config::ServerConfig;
use mintgate_server::handlers::{AppState, NOTIFY_PATH, gate_router};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Mint gate failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::load()?;

    // Fail fast on an absent or ill-formed treasury, contract, or price.
    let resolved = config.resolve_chain()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        network = %config.price.network,
        treasury = %resolved.treasury,
        nft_contract = %resolved.nft_contract,
        "Loaded configuration"
    );

    let signer: PrivateKeySigner = config
        .chain
        .signer_private_key
        .trim()
        .parse()
        .map_err(|e| format!("Invalid signer key: {e}"))?;
    tracing::info!(wallet = %signer.address(), "Loaded mint signer");

    let wallet = EthereumWallet::from(signer);
    let rpc_url: Url = config
        .chain
        .rpc_url
        .parse()
        .map_err(|e| format!("Invalid RPC URL: {e}"))?;
    let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url);

    let verifier = EvmPaymentVerifier::new(
        provider.clone(),
        resolved.asset_contract,
        resolved.treasury,
        resolved.min_amount,
    )
    .with_rpc_timeout(resolved.rpc_timeout);
    let minter =
        EvmMinter::new(provider, resolved.nft_contract).with_mint_timeout(resolved.mint_timeout);

    // The resource bound into derived payment ids: the public notify URL
    // when one is configured, a fixed identifier otherwise.
    let resource = config.public_url.as_deref().map_or_else(
        || DEFAULT_RESOURCE.to_owned(),
        |base| format!("{}{NOTIFY_PATH}", base.trim_end_matches('/')),
    );

    let gate = MintGate::new(Box::new(verifier), Box::new(minter), resource);
    let state = Arc::new(AppState {
        gate,
        challenge: config.challenge_config(),
        public_url: config.public_url.clone(),
    });

    // Build Axum router
    let app = gate_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::HEAD, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mint gate listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Mint gate shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
