//! Projection compiler options.
//!
//! Which members count as order/identity keys is a property of the shape
//! cache (`ShapeCache::with_contract`), since capabilities are resolved once
//! per shape at synthesis time.

use relshape_ir::Direction;

#[derive(Clone, Copy, Debug)]
pub struct CompilerConfig {
    /// Attach capability-derived ordering to sequence bindings (default: on).
    pub(crate) auto_order: bool,
    /// Direction of capability-derived ordering (default: ascending).
    pub(crate) direction: Direction,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            auto_order: true,
            direction: Direction::Asc,
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable capability-derived ordering.
    ///
    /// Explicit per-selector overrides apply either way.
    pub fn auto_order(mut self, enabled: bool) -> Self {
        self.auto_order = enabled;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn get_auto_order(&self) -> bool {
        self.auto_order
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }
}
