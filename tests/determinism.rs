use wdvn_rs::{
    defs::{Buttons, MAN_COUNT, ManKind, TILE},
    sim::{Input, ReplayReader, ReplayWriter, SimState, TicRunner},
    world::{Coord, TileWorld, levels},
};

/// Deterministic but busy input: every slot mashes something different.
fn script(tick: u64) -> [Option<Input>; MAN_COUNT] {
    let phase = |n: u64| (tick / n) % 2 == 0;
    [
        Some(Input::aim(150, -23).with(if phase(70) { Buttons::MOUSE2 } else { Buttons::KEY_LEFT })),
        Some(Input::aim(0, 40).with(if phase(40) { Buttons::MOUSE1 } else { Buttons::MOUSE2 })),
        Some(Input::aim(-200, -23).with(if phase(50) { Buttons::MOUSE1 } else { Buttons::MOUSE2 })),
        Some(Input::aim(10, 0).with(if phase(30) { Buttons::KEY_UP | Buttons::KEY_RIGHT } else { Buttons::KEY_DOWN })),
    ]
}

fn run(world: &TileWorld, seed: u32, ticks: u64) -> SimState {
    let mut state = SimState::new(world, seed);
    state.spawn_grub(Coord::new(20 * TILE, 10 * TILE));
    state.spawn_grub(Coord::new(30 * TILE, 10 * TILE));
    for t in 1..=ticks {
        state.update(world, &script(t));
    }
    state
}

#[test]
fn same_seed_same_bytes() {
    let world = levels::proving_ground();
    let a = run(&world, 77, 600);
    let b = run(&world, 77, 600);
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    assert_eq!(a.checksum().unwrap(), b.checksum().unwrap());
}

#[test]
fn world_file_round_trip_preserves_simulation() {
    let world = levels::proving_ground();
    let reloaded = TileWorld::from_bytes(&world.to_bytes().unwrap()).unwrap();
    assert_eq!(reloaded, world);
    assert_eq!(run(&world, 5, 200), run(&reloaded, 5, 200));
}

#[test]
fn replay_reproduces_every_tick() {
    let mut runner = TicRunner::new(levels::proving_ground(), 123);
    let mut writer = ReplayWriter::new(Vec::new()).unwrap();
    let mut expected = Vec::new();
    for t in 1..=150 {
        for kind in ManKind::ALL {
            match script(t)[kind.index()] {
                Some(input) => runner.submit(kind, input),
                None => runner.release(kind),
            }
        }
        let bytes = runner.tick().unwrap();
        writer.push_bytes(&bytes).unwrap();
        expected.push(runner.state().checksum().unwrap());
    }
    let file = writer.finish().unwrap();

    let got: Vec<u64> = ReplayReader::new(file.as_slice())
        .unwrap()
        .map(|s| s.unwrap().checksum().unwrap())
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn resumed_snapshot_continues_identically() {
    let world = levels::proving_ground();
    let mut live = run(&world, 9, 250);
    let mut resumed = SimState::from_bytes(&live.to_bytes().unwrap()).unwrap();
    for t in 251..=400 {
        live.update(&world, &script(t));
        resumed.update(&world, &script(t));
    }
    assert_eq!(live, resumed);
}

#[test]
fn health_and_ids_stay_in_range() {
    let world = levels::proving_ground();
    let mut state = SimState::new(&world, 31);
    for t in 1..=500 {
        state.update(&world, &script(t));
        for kind in ManKind::ALL {
            let h = state.man(kind).body.health;
            assert!((0..=kind.info().max_health).contains(&h), "{kind:?} health {h}");
        }
        assert!(state.units.keys().all(|&k| k < state.next_unit));
        assert!(state.floaters.iter().all(|f| f.live(state.tick)));
    }
}
