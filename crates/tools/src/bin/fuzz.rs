use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use trainer_sight::field::ObjectEvents;
use trainer_sight::{AdvanceStopReason, Direction, ScenarioFile, Session, SessionError};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON file to walk around in
    #[arg(long)]
    scenario: PathBuf,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    inputs: u32,
    /// Write the recorded journal here for later replay
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn resolve_battle(session: &mut Session, rng: &mut ChaCha8Rng) -> Result<()> {
    let result = session.advance(5_000);
    if let AdvanceStopReason::BattleReady { trainers } = result.stop_reason {
        println!("Battle against {} trainer(s) at frame {}", trainers, session.current_frame());
    }
    // Two-trainer battles need one end per trainer.
    for _ in 0..2 {
        if !session.battle_pending() {
            break;
        }
        session.end_approach()?;
        if session.battle_pending() && !session.prepare_second_trainer() {
            bail!("battle still pending with no second trainer to prepare");
        }
    }
    if session.battle_pending() {
        bail!("battle still pending after every trainer was resolved");
    }
    session.face_after_battle(choose(rng, &[0, 1]));
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let json = fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read {}", args.scenario.display()))?;
    let scenario = ScenarioFile::from_json(&json)?;
    let mut session = Session::new(scenario.build(None)?);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let directions = [Direction::South, Direction::North, Direction::West, Direction::East];

    println!("Starting fuzz walk on seed {} for {} inputs...", args.seed, args.inputs);
    for _ in 0..args.inputs {
        match session.step_player(choose(&mut rng, &directions)) {
            Ok(_) | Err(SessionError::PlayerBusy) => {}
            Err(err) => bail!("unexpected step rejection: {err}"),
        }
        if session.battle_pending() {
            resolve_battle(&mut session, &mut rng)?;
        }
        session.advance(choose(&mut rng, &[1, 4, 16, 32]));

        // Assert invariants
        let world = session.world();
        assert!(session.sight().approaching().len() <= 2, "Invariant failed: registry overflow");
        for id in world.actor_ids() {
            let Some(actor) = world.actor(id) else { continue };
            assert!(world.grid().in_bounds(actor.pos), "Invariant failed: actor left the map");
        }
    }

    if let Some(out) = &args.out {
        fs::write(out, serde_json::to_string_pretty(session.journal())?)
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }
    println!("Fuzzing completed at frame {}.", session.current_frame());
    println!("Snapshot Hash: {}", session.snapshot_hash());
    Ok(())
}
