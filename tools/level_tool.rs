//! level_tool - create, inspect and edit world files from the shell.
//!
//! USAGE:
//! ```bash
//! cargo run --bin level_tool -- new arena.wdvn --width 40 --height 12
//! cargo run --bin level_tool -- set arena.wdvn 10 8 --special bounce
//! cargo run --bin level_tool -- show arena.wdvn
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use wdvn_rs::{
    config,
    world::{SpecialTile, TileWorld, levels},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write a new world: the proving ground, or a walled arena
    New {
        out: PathBuf,
        #[arg(long, requires = "height")]
        width: Option<i64>,
        #[arg(long, requires = "width")]
        height: Option<i64>,
    },
    /// Print bounds, tile counts and the spawn point
    Info { file: PathBuf },
    /// Draw the world as ASCII
    Show {
        file: PathBuf,
        /// Extra clamped border to draw around the bounds
        #[arg(long, default_value_t = 0)]
        margin: i64,
    },
    /// Edit one tile; the bounds grow and shrink as needed
    Set {
        file: PathBuf,
        #[arg(allow_hyphen_values = true)]
        x: i64,
        #[arg(allow_hyphen_values = true)]
        y: i64,
        #[arg(long, conflicts_with = "clear")]
        solid: bool,
        #[arg(long)]
        clear: bool,
        /// none | bounce | checkpoint
        #[arg(long)]
        special: Option<String>,
        /// Visual tile index
        #[arg(long)]
        visual: Option<u16>,
    },
}

fn load(path: &Path) -> anyhow::Result<TileWorld> {
    TileWorld::load(path).with_context(|| format!("reading {}", path.display()))
}

fn glyph(solid: bool, special: SpecialTile) -> char {
    match (solid, special) {
        (_, SpecialTile::Bounce) => '^',
        (_, SpecialTile::Checkpoint) => 'P',
        (true, SpecialTile::None) => '#',
        (false, SpecialTile::None) => '.',
    }
}

fn main() -> anyhow::Result<()> {
    config::init_runtime();
    let opts = Opts::parse();

    match opts.cmd {
        Cmd::New { out, width, height } => {
            let world = match (width, height) {
                (Some(w), Some(h)) if w >= 3 && h >= 2 => levels::arena(w, h),
                (Some(w), Some(h)) => bail!("arena {w}x{h} is too small"),
                _ => levels::proving_ground(),
            };
            world.save(&out)?;
        }

        Cmd::Info { file } => {
            let world = load(&file)?;
            let (min, max) = (world.min(), world.max());
            println!("bounds   ({}, {}) ..= ({}, {})", min.x, min.y, max.x, max.y);
            println!("size     {} x {}", world.width(), world.height());
            let solid = world.iter().filter(|(_, _, t)| t.solid).count();
            println!("solid    {solid}");
            for special in [SpecialTile::Bounce, SpecialTile::Checkpoint] {
                let n = world.iter().filter(|(_, _, t)| t.special == special).count();
                println!("{:<8} {n}", special.name());
            }
            let spawn = world.spawn_point();
            println!("spawn    ({}, {})", spawn.x, spawn.y);
        }

        Cmd::Show { file, margin } => {
            let world = load(&file)?;
            let (min, max) = (world.min(), world.max());
            for y in min.y - margin..=max.y + margin {
                let row: String = (min.x - margin..=max.x + margin)
                    .map(|x| {
                        let t = world.tile(x, y);
                        glyph(t.solid, t.special)
                    })
                    .collect();
                println!("{row}");
            }
        }

        Cmd::Set {
            file,
            x,
            y,
            solid,
            clear,
            special,
            visual,
        } => {
            let mut world = load(&file)?;
            let special = match special.as_deref() {
                Some(name) => Some(
                    SpecialTile::from_name(name)
                        .with_context(|| format!("unknown special tile {name:?}"))?,
                ),
                None => None,
            };
            if !solid && !clear && special.is_none() && visual.is_none() {
                bail!("nothing to change: pass --solid, --clear, --special or --visual");
            }
            world.edit(x, y, |t| {
                if solid {
                    t.solid = true;
                }
                if clear {
                    t.solid = false;
                    t.special = SpecialTile::None;
                }
                if let Some(s) = special {
                    t.special = s;
                }
                if let Some(v) = visual {
                    t.tile = v;
                }
            });
            world.save(&file)?;
        }
    }
    Ok(())
}
