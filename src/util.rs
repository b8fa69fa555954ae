//! Timing helpers for the expensive one-off computations.

use std::time::Instant;

/// RAII timer that logs elapsed time and per-tile throughput on drop.
///
/// ```ignore
/// let _t = Timed::debug("Nearest-neighbor scan", sphere.num_tiles());
/// // logs "Nearest-neighbor scan: 12.345ms (10000 tiles)" when dropped
/// ```
pub struct Timed {
    name: &'static str,
    tiles: usize,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Timer that reports at INFO level.
    pub fn info(name: &'static str, tiles: usize) -> Self {
        Self::start(name, tiles, log::Level::Info)
    }

    /// Timer that reports at DEBUG level.
    pub fn debug(name: &'static str, tiles: usize) -> Self {
        Self::start(name, tiles, log::Level::Debug)
    }

    fn start(name: &'static str, tiles: usize, level: log::Level) -> Self {
        log::trace!("{} over {} tiles...", name, tiles);
        Self {
            name,
            tiles,
            start: Instant::now(),
            level,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::log!(
            self.level,
            "{}: {:.3?} ({} tiles)",
            self.name,
            elapsed,
            self.tiles
        );
    }
}
