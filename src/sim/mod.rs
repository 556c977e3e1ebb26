mod collision;
mod components;
mod input;
mod man;
mod mob;
mod movement;
mod random;
mod replay;
mod snapshot;
mod state;
mod tic;

pub use collision::{Side, Trace, TraceUnit};
pub use components::{Actor, Body, Class, Fate, Floater, Look, Unit, UnitId, UnitKind};
pub use input::Input;
pub use man::{Ability, Density, Man, ManState, Vacuum, Whip};
pub use mob::{Grub, Lemon};
pub use random::SeededRandom;
pub use replay::{REPLAY_VERSION, ReplayError, ReplayReader, ReplayWriter};
pub use snapshot::SnapshotError;
pub use state::SimState;
pub use tic::{TIC, TicRunner};
