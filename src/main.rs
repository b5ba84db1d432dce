//! Prism Grid Demo
//!
//! Plays the opening levels of a pack headlessly, then replays the recorded
//! session and checks that it reproduces the same state hash.
//!
//! Usage: `prism-grid [LEVEL_PACK.json] [CONFIG.json]`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use prism_grid::{
    GridVec2, TICK_RATE, VERSION,
    game::{
        campaign::Campaign,
        config::SimConfig,
        events::GameEventData,
        input::{Command, InputRecording},
        level::LevelPack,
        tick::{tick, replay},
    },
};

/// Upper bound on demo length.
const DEMO_TICKS: u32 = 1200;

/// Cells touched, in order, at one point of a level.
struct ScriptStep {
    level: u32,
    at_tick: u32,
    touches: &'static [(i32, i32)],
}

const SCRIPT: &[ScriptStep] = &[
    // Level 2: swap the blue block and the emitter facing away from it
    ScriptStep { level: 1, at_tick: 10, touches: &[(2, 5), (3, 5)] },
];

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Prism Grid v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut args = std::env::args().skip(1);
    let pack = match args.next() {
        Some(path) => load_pack(Path::new(&path))?,
        None => LevelPack::builtin(),
    };
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => SimConfig::default(),
    };

    demo_session(pack, config)
}

fn load_pack(path: &Path) -> Result<LevelPack> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading level pack {}", path.display()))?;
    let pack = LevelPack::from_json_str(&json)
        .with_context(|| format!("parsing level pack {}", path.display()))?;
    let blocks: u32 = pack.levels.iter().map(|level| level.block_total()).sum();
    info!("Loaded {} levels ({} blocks) from {}", pack.len(), blocks, path.display());
    Ok(pack)
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SimConfig::from_json_str(&json).with_context(|| format!("parsing config {}", path.display()))
}

/// Commands the script issues at the current point of the campaign.
fn scripted_commands(campaign: &Campaign) -> Vec<Command> {
    SCRIPT
        .iter()
        .filter(|step| step.level == campaign.level_index() && step.at_tick == campaign.level.tick)
        .flat_map(|step| step.touches.iter().map(|&(x, y)| Command::touch(GridVec2::new(x, y))))
        .collect()
}

/// Play until the first two levels are cleared, then verify by replay.
fn demo_session(pack: LevelPack, config: SimConfig) -> Result<()> {
    info!("=== Starting Demo Session ===");

    let mut campaign = Campaign::new(pack.clone(), config)?;
    let mut recording = InputRecording::new();
    let mut total_events = campaign.take_events().len();

    info!("Level 0: {}", campaign.level.status_text);

    for t in 0..DEMO_TICKS {
        let commands = scripted_commands(&campaign);
        recording.record(t, &commands);

        let result = tick(&mut campaign, &commands);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::Swapped { a, b, moves } => {
                    info!("Tick {}: swapped {} and {} (move {})", t, a, b, moves);
                }
                GameEventData::BlockDestroyed { position, color, blocks_remaining } => {
                    info!("Tick {}: {:?} block at {} destroyed, {} left", t, color, position, blocks_remaining);
                }
                GameEventData::LevelWon { moves, ticks_since_load } => {
                    info!(
                        "Level {} won in {} ticks with {} moves",
                        event.level, ticks_since_load, moves
                    );
                }
                GameEventData::LevelLoaded { blocks } => {
                    info!(
                        "Level {}: {} ({} blocks)",
                        event.level, campaign.level.status_text, blocks
                    );
                }
                GameEventData::CampaignCompleted => info!("{}", campaign.level.status_text),
                _ => {}
            }
        }
        if result.level_won() {
            info!("Board:\n{}", campaign.level.view().to_ascii());
        }

        if campaign.level_index() >= 2 || campaign.is_completed() {
            info!("Stopping after tick {}", t);
            break;
        }
    }

    // Print final results
    info!("=== Session Results ===");
    let hash = campaign.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {}", total_events);
    info!("Recorded commands: {}", recording.command_count());

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay(pack, config, recording.replay_iter().map(|(_, commands)| commands))?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    anyhow::ensure!(hash == replay_hash, "replay diverged from the live session");
    info!("Determinism verified");

    Ok(())
}
