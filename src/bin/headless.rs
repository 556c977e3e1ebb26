//! Run the simulation without a renderer.
//!
//! ```bash
//! cargo run --release -- --ticks 3000 --grubs 4 --script chaos --record run.wdvr
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::{fs::File, io::BufWriter, path::PathBuf, time::Duration};

use wdvn_rs::{
    config,
    defs::{Buttons, MAN_COUNT, ManKind, TILE},
    sim::{Input, ReplayWriter, SeededRandom, SimState, TicRunner},
    world::{Coord, TileWorld, levels},
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Script {
    /// Nobody touches the controls.
    Idle,
    /// Everyone walks right and jumps now and then.
    Walk,
    /// Random buttons and aim, reproducible from the seed.
    Chaos,
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// World file; the built-in proving ground when omitted
    #[arg(long, value_name = "FILE")]
    world: Option<PathBuf>,

    /// Ticks to simulate [env: WDVN_TICKS]
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulation seed [env: WDVN_SEED]
    #[arg(long)]
    seed: Option<u32>,

    /// Grubs dropped around the spawn point
    #[arg(long, default_value_t = 0)]
    grubs: u32,

    #[arg(long, value_enum, default_value_t = Script::Walk)]
    script: Script,

    /// Pace ticks in real time instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Write every snapshot to a replay file
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,
}

fn script_input(script: Script, tick: u64, slot: usize, rng: &mut SeededRandom) -> Option<Input> {
    match script {
        Script::Idle => None,
        Script::Walk => {
            let mut input = Input::aim(100, -23).with(Buttons::KEY_RIGHT);
            if (tick + slot as u64 * 25) % 100 < 10 {
                input = input.with(Buttons::KEY_UP);
            }
            input.tick = tick;
            Some(input)
        }
        Script::Chaos => {
            let mut input = Input::aim(rng.below(601) - 300, rng.below(401) - 300);
            input.buttons = Buttons::from_bits_truncate(rng.next_u32() as u8);
            input.tick = tick;
            Some(input)
        }
    }
}

fn main() -> anyhow::Result<()> {
    config::init_runtime();
    let opts = Opts::parse();

    // ─────────── world & runner ───────────
    let world = match &opts.world {
        Some(path) => TileWorld::load(path)
            .with_context(|| format!("loading world {}", path.display()))?,
        None => levels::proving_ground(),
    };
    let seed = opts.seed.unwrap_or_else(config::default_seed);
    let ticks = opts.ticks.unwrap_or_else(config::default_ticks);
    let mut run = TicRunner::new(world, seed).with_interval(config::tick_interval());

    let spawn = run.state().spawn_point;
    for i in 0..opts.grubs as i64 {
        let offset = (i - opts.grubs as i64 / 2) * 2 * TILE;
        run.state_mut().spawn_grub(spawn + Coord::new(offset, -TILE));
    }

    let mut recorder = match &opts.record {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating replay {}", path.display()))?;
            Some(ReplayWriter::new(BufWriter::new(file))?)
        }
        None => None,
    };

    // ─────────── main loop ───────────
    // script randomness is separate from the simulation's own generator
    let mut script_rng = SeededRandom::new(seed ^ 0x9e37_79b9);
    while run.state().tick < ticks {
        let next = run.state().tick + 1;
        for kind in ManKind::ALL {
            match script_input(opts.script, next, kind.index(), &mut script_rng) {
                Some(input) => run.submit(kind, input),
                None => run.release(kind),
            }
        }

        let frames = if opts.realtime {
            let frames = run.pump()?;
            if frames.is_empty() {
                std::thread::sleep(Duration::from_millis(1));
            }
            frames
        } else {
            vec![run.tick()?]
        };
        if let Some(rec) = recorder.as_mut() {
            for frame in &frames {
                rec.push_bytes(frame)?;
            }
        }
    }
    if let Some(rec) = recorder {
        rec.finish()?;
    }

    print_summary(run.state())
}

fn print_summary(state: &SimState) -> anyhow::Result<()> {
    println!("tick {}  units {}  floaters {}", state.tick, state.units.len(), state.floaters.len());
    for i in 0..MAN_COUNT {
        let unit = &state.mans[i];
        let Some(man) = unit.as_man() else { continue };
        let p = unit.body.position;
        println!(
            "  {:<8} health {:>6}  lives {:>3}  at ({:.1}, {:.1}) tiles",
            man.state.kind.info().name,
            unit.body.health,
            man.state.lives,
            p.x as f64 / TILE as f64,
            p.y as f64 / TILE as f64,
        );
    }
    println!("checksum {:016x}", state.checksum()?);
    Ok(())
}
