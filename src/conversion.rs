/// Conversion helpers for X-series encoder space (4096 ticks / revolution)
/// with configurable logical zero. Positions are multi-turn, so nothing wraps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionConversion {
    pub ticks_per_rev: i32,
    pub zero_tick: i32,
}

impl Default for PositionConversion {
    fn default() -> Self {
        Self {
            ticks_per_rev: 4096,
            zero_tick: 0,
        }
    }
}

impl PositionConversion {
    pub fn new(zero_tick: i32) -> Self {
        Self {
            ticks_per_rev: 4096,
            zero_tick,
        }
    }

    /// Convert raw position ticks to degrees around logical zero.
    pub fn tick_to_deg(&self, raw_tick: i32) -> f64 {
        (raw_tick as f64 - self.zero_tick as f64) * 360.0 / (self.ticks_per_rev as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_zero_deg() {
        let c = PositionConversion::new(2048);
        assert!(c.tick_to_deg(2048).abs() < 1e-9);
    }

    #[test]
    fn full_turns_do_not_wrap() {
        let c = PositionConversion::default();
        assert!((c.tick_to_deg(4096 * 3) - 1080.0).abs() < 1e-9);
        assert!((c.tick_to_deg(-1024) + 90.0).abs() < 1e-9);
    }
}
