use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sonami_engine::{
    LocalProvider, Mood, NullDevice, PlaybackEvent, Player, PlayerConfig, SuggestionContext,
    Track, TrackSource,
};

fn demo_track(
    id: &str,
    title: &str,
    artist: &str,
    secs: u64,
    energy: f32,
    mood: Mood,
    genre: &str,
) -> Track {
    Track::new(id, title, artist, Duration::from_secs(secs))
        .with_energy(energy)
        .with_mood(mood)
        .with_genre(genre)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => PlayerConfig::load_from(&PathBuf::from(path))?,
        None => PlayerConfig::load()?,
    };

    let player = Player::new(config, Arc::new(NullDevice::new()));

    let local = LocalProvider::new("local", "Local Files", TrackSource::Local).with_tracks(vec![
        demo_track("l1", "Night Drive", "Kavinsky", 3, 0.8, Mood::Energetic, "synthwave"),
        demo_track("l2", "Nightcall", "Kavinsky", 4, 0.6, Mood::Chill, "synthwave"),
        demo_track("l3", "Weightless", "Marconi Union", 5, 0.1, Mood::Relaxing, "ambient"),
    ]);
    let remote = LocalProvider::new("subsonic", "Home Server", TrackSource::Subsonic)
        .with_tracks(vec![
            demo_track("s1", "Genesis", "Justice", 3, 0.9, Mood::Party, "electro"),
            demo_track("s2", "Midnight City", "M83", 4, 0.7, Mood::Upbeat, "synthpop"),
        ]);
    player.providers().register_provider(Arc::new(local)).await;
    player.providers().register_provider(Arc::new(remote)).await;

    let aggregated = player.refresh_library().await;
    for failure in &aggregated.failures {
        log::warn!("[Demo] {} contributed nothing: {}", failure.provider_id, failure.kind);
    }

    let (_, events) = player.notifier().subscribe_channel();
    player.play_library(0);

    for context in [
        SuggestionContext::General,
        SuggestionContext::Workout,
        SuggestionContext::Relaxing,
    ] {
        println!("Suggestions ({:?}):", context);
        for suggestion in player.refresh_suggestions(context, 3) {
            println!(
                "  {:.3}  {} - {}",
                suggestion.score, suggestion.track.artist, suggestion.track.title
            );
        }
    }

    // Let the clock play through the first couple of tracks.
    tokio::time::sleep(Duration::from_secs(8)).await;
    player.audio().stop();

    for event in events.try_iter() {
        if let PlaybackEvent::TrackStarted { track } = event {
            println!("Played: {} - {}", track.artist, track.title);
        }
    }

    let snapshot = player.audio().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
