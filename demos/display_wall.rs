//! Display wall demo: late join and cold-start recovery
//!
//! Run with: cargo run --example display_wall [SNAPSHOT_DIR]
//!
//! Demonstrates the recovery paths a real display hits:
//! - a display joining after content was already published recovers it
//!   through the request_content round trip
//! - restarting the process re-renders the last snapshot immediately,
//!   before the live subscription confirms it
//!
//! Run it twice with the same SNAPSHOT_DIR to see the cold-start render.

use std::sync::Arc;
use std::time::Duration;

use screensync::broker::Broker;
use screensync::model::{ContentPatch, ScreenId};
use screensync::publisher::PublisherSession;
use screensync::snapshot::ContentSnapshotStore;
use screensync::subscriber::{DisplayPhase, SubscriberClient, SubscriberConfig};

#[tokio::main]
async fn main() -> screensync::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screensync=debug".into()),
        )
        .init();

    let dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./screensync-snapshots".to_string());

    let broker = Arc::new(Broker::new());
    let snapshots = Arc::new(ContentSnapshotStore::open(&dir).await?);
    println!("snapshot store at {dir} ({} records)", snapshots.len().await);

    // Publisher sets content before any display exists
    let panel = PublisherSession::new(Arc::clone(&broker), Arc::clone(&snapshots));
    let screen = panel.add_screen().await;
    panel
        .update_screen_content(&screen, &ContentPatch::url("schedule.png"))
        .await?;

    // Display joins late: no publish happens after this point, yet it
    // still reaches Displaying via the request/response handshake
    let (display, mut events) = SubscriberClient::new(
        Arc::clone(&broker),
        Arc::clone(&snapshots),
        ScreenId::new("1"),
        SubscriberConfig::default(),
    );

    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while display.phase() != DisplayPhase::Displaying {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => println!("[display] {:?}", event),
                None => break,
            },
            _ = tokio::time::sleep_until(deadline) => break,
        }
    }

    match display.current_content() {
        Some(content) => println!("displaying: {} (phase {:?})", content.url, display.phase()),
        None => println!("no content recovered (phase {:?})", display.phase()),
    }

    display.shutdown();
    panel.shutdown().await;

    Ok(())
}
