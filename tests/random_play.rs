//! Random play: invariants that must hold whatever the player does.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use prism_grid::game::{
    campaign::Campaign,
    config::SimConfig,
    entity::EntityKind,
    input::{Command, InputRecording},
    level::LevelPack,
    state::LevelState,
    tick::{replay, tick},
};

fn check_invariants(level: &LevelState) {
    assert!(level.is_consistent(), "grid and arena disagree at tick {}", level.tick);

    let live_blocks = level
        .entities
        .values()
        .filter(|e| matches!(e.kind, EntityKind::Block(_)))
        .count() as u32;
    assert_eq!(level.block_count, live_blocks);

    // The anchor can go stale mid-tick (struck or fallen); it is only
    // revalidated at the start of the next tick
    if let Some(sel) = level.selection {
        assert!(level.grid.in_bounds(sel), "selection off the grid at {sel}");
    }

    // Beam chains never outrun the grid
    let max_run = level.grid.max_run() as usize;
    for (id, _) in level.entities.iter() {
        assert!(prism_grid::game::beam::chain_len(level, id) < max_run);
    }
}

fn random_command(rng: &mut StdRng) -> Command {
    match rng.gen_range(0..100) {
        0 => Command::Restart,
        1 => Command::SkipLevel,
        2 => Command::PreviousLevel,
        _ => Command::Touch { x: rng.gen_range(-1..7), y: rng.gen_range(-1..7) },
    }
}

#[test]
fn test_seeded_random_sessions_hold_invariants() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut campaign = Campaign::new(LevelPack::builtin(), SimConfig::default()).unwrap();
        let mut recording = InputRecording::new();

        for t in 0..1500 {
            let commands: Vec<Command> = if rng.gen_bool(0.2) {
                (0..rng.gen_range(1..3)).map(|_| random_command(&mut rng)).collect()
            } else {
                Vec::new()
            };
            recording.record(t, &commands);
            tick(&mut campaign, &commands);
            check_invariants(&campaign.level);
        }

        let (replayed, _) = replay(
            LevelPack::builtin(),
            SimConfig::default(),
            recording.replay_iter().map(|(_, commands)| commands),
        )
        .unwrap();
        assert_eq!(replayed.compute_hash(), campaign.compute_hash(), "seed {seed}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_touches_keep_level_consistent(
        start in 0u32..9,
        touches in proptest::collection::vec((0u32..400, 0i32..6, 0i32..6), 0..30),
    ) {
        let mut campaign =
            Campaign::starting_at(LevelPack::builtin(), SimConfig::default(), start).unwrap();
        let mut touches = touches;
        touches.sort_by_key(|&(t, _, _)| t);

        let mut pending = touches.into_iter().peekable();
        for t in 0..400 {
            let mut commands = Vec::new();
            while let Some(&(at, x, y)) = pending.peek() {
                if at != t {
                    break;
                }
                commands.push(Command::Touch { x, y });
                pending.next();
            }
            tick(&mut campaign, &commands);

            let level = &campaign.level;
            prop_assert!(level.is_consistent());
            if let Some(sel) = level.selection {
                prop_assert!(level.grid.in_bounds(sel));
            }
        }
    }
}
