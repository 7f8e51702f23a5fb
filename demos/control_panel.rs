//! Control panel demo: one publisher driving two displays
//!
//! Run with: cargo run --example control_panel
//!
//! Simulates an operator session end to end:
//! - creates two screens and attaches a display client to each
//! - pushes content updates and watches them fan out
//! - removes a screen and shows the dense re-index
//! - saves the session to an in-memory session store

use std::sync::Arc;
use std::time::Duration;

use screensync::broker::Broker;
use screensync::model::{ContentKind, ContentPatch, MediaItem};
use screensync::publisher::PublisherSession;
use screensync::snapshot::{ContentSnapshotStore, SessionStore};
use screensync::subscriber::{SubscriberClient, SubscriberConfig};

#[tokio::main]
async fn main() -> screensync::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screensync=info".into()),
        )
        .init();

    let broker = Arc::new(Broker::new());
    let snapshots = Arc::new(ContentSnapshotStore::in_memory());
    let sessions = SessionStore::in_memory();

    let panel = PublisherSession::new(Arc::clone(&broker), Arc::clone(&snapshots));

    // Two screens on the wall
    let lobby = panel.add_screen().await;
    let bar = panel.add_screen().await;
    println!("screens: {:?}", panel.screens().await.iter().map(|s| s.name.clone()).collect::<Vec<_>>());

    // One display client per screen
    let mut displays = Vec::new();
    for id in [lobby.clone(), bar.clone()] {
        let (client, mut events) = SubscriberClient::new(
            Arc::clone(&broker),
            Arc::clone(&snapshots),
            id.clone(),
            SubscriberConfig::default(),
        );
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                println!("[display {}] {:?}", id, event);
            }
        });
        displays.push(client);
    }

    // Operator drops media onto the lobby screen
    let poster = MediaItem::new("m1", "Evening Poster", ContentKind::Image, "poster.png");
    panel.drop_media(&poster, &lobby).await?;

    // ... and tweaks the transform on the bar screen
    panel
        .update_screen_content(
            &bar,
            &ContentPatch {
                url: Some("menu.png".into()),
                rotation: Some(90.0),
                ..Default::default()
            },
        )
        .await?;

    tokio::time::sleep(Duration::from_millis(200)).await;

    // Removing screen 1 re-indexes the rest: old "2" becomes "1"
    panel.remove_screen(&lobby).await?;
    for screen in panel.screens().await {
        println!("after remove: id={} name={}", screen.id, screen.name);
    }

    // Save the whole session by name
    panel.set_slideshow(true, Duration::from_secs(5)).await;
    sessions.save("evening", &panel.session().await).await?;
    println!("saved sessions: {:?}", sessions.list().await);

    for display in displays {
        display.shutdown();
    }
    panel.shutdown().await;

    Ok(())
}
