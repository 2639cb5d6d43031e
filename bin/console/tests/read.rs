//! Integration tests for token reads against a live network.
//!
//! These tests require `tests/test-config.toml`; see
//! `tests/test-config.toml.example`.
//!
//! Run with:
//! ```bash
//! cargo test --package token-console --test read -- --ignored
//! ```


use alloy_primitives::Address;
use setup::{load_test_config, setup_read_only_console};

#[tokio::test]
#[ignore]
async fn test_load_metadata_and_balance() {
    let console = setup_read_only_console();

    let token = console
        .reader()
        .load_metadata_and_balance(Address::ZERO)
        .await
        .expect("Failed to load token state");

    println!("✓ Token: {} ({})", token.name, token.symbol);
    println!("  Decimals: {}", token.decimals);
    println!("  Total supply: {}", token.total_supply);

    assert!(!token.symbol.is_empty());
    assert_eq!(
        units::encode(&token.total_supply, token.decimals)
            .map(|raw| units::decode(raw, token.decimals))
            .unwrap(),
        token.total_supply
    );
}

#[tokio::test]
#[ignore]
async fn test_load_owner() {
    let console = setup_read_only_console();

    let owner = console.reader().load_owner().await;

    println!("✓ Owner: {owner:?}");
    assert!(owner.is_some());
}

#[tokio::test]
#[ignore]
async fn test_session_without_wallet_loads_owner() {
    let console = setup_read_only_console();
    let controller = console.controller();

    controller.start().await;
    let snapshot = controller.snapshot();

    assert!(!snapshot.session().connected);
    assert!(snapshot.token.is_none());
    assert!(snapshot.owner.is_some());
}

#[test]
#[ignore]
fn test_config_has_token() {
    let config = load_test_config();
    assert!(config.network_config().validate().is_ok());
}
