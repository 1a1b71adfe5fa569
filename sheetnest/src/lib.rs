use std::sync::LazyLock;
use std::time::Instant;

pub mod config;
pub mod entities;
pub mod ga;
pub mod io;
pub mod nester;
pub mod nfp;
pub mod placement;
pub mod util;

pub static EPOCH: LazyLock<Instant> = LazyLock::new(Instant::now);
