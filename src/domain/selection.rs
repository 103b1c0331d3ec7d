//! Cycling through a stack of overlapping hits

/// Wheel direction reported by the input layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDirection {
    Up,
    Down,
}

/// Depth into the last hit-test result, counted from its innermost end
///
/// The stored depth is not clamped when changed, only when read against the
/// current stack size, so the stack may change between wheel events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionCycler {
    depth_from_top: isize,
    threshold: u32,
    up_ticks: u32,
    down_ticks: u32,
}

impl Default for SelectionCycler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl SelectionCycler {
    /// Same-direction ticks needed for one debounced step
    pub const DEFAULT_THRESHOLD: u32 = 5;

    pub fn new(threshold: u32) -> Self {
        Self {
            depth_from_top: 0,
            threshold: threshold.max(1),
            up_ticks: 0,
            down_ticks: 0,
        }
    }

    /// Raw depth, possibly outside the current stack
    pub fn raw_depth(&self) -> isize {
        self.depth_from_top
    }

    /// Depth clamped into `[0, count - 1]`
    pub fn depth(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        self.depth_from_top.clamp(0, count as isize - 1) as usize
    }

    /// Index into a stack of `count` hits, innermost last
    pub fn index(&self, count: usize) -> Option<usize> {
        count.checked_sub(1).map(|last| last - self.depth(count))
    }

    pub fn cycle(&mut self, delta: isize) {
        self.depth_from_top += delta;
    }

    /// Snap the raw depth back into range
    pub fn settle(&mut self, count: usize) {
        self.depth_from_top = self.depth(count) as isize;
    }

    /// Count wheel ticks; every `threshold` ticks in one direction moves one step
    ///
    /// Wheel up walks towards the innermost hit, wheel down towards the outermost.
    /// Returns true when the depth changed.
    pub fn cycle_debounced(&mut self, direction: WheelDirection) -> bool {
        let (ticks, delta) = match direction {
            WheelDirection::Up => {
                self.down_ticks = 0;
                (&mut self.up_ticks, -1)
            }
            WheelDirection::Down => {
                self.up_ticks = 0;
                (&mut self.down_ticks, 1)
            }
        };
        *ticks += 1;
        if *ticks < self.threshold {
            return false;
        }
        *ticks = 0;
        self.cycle(delta);
        log::debug!("Selection depth now {}", self.depth_from_top);
        true
    }

    pub fn reset(&mut self) {
        self.depth_from_top = 0;
        self.up_ticks = 0;
        self.down_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_clamped_on_read() {
        let mut cycler = SelectionCycler::default();
        cycler.cycle(7);
        assert_eq!(cycler.raw_depth(), 7);
        assert_eq!(cycler.depth(3), 2);
        assert_eq!(cycler.index(3), Some(0));
        cycler.cycle(-10);
        assert_eq!(cycler.depth(3), 0);
        assert_eq!(cycler.index(3), Some(2));
        assert_eq!(cycler.index(0), None);
    }

    #[test]
    fn test_debounce_needs_five_ticks() {
        let mut cycler = SelectionCycler::default();
        for _ in 0..4 {
            assert!(!cycler.cycle_debounced(WheelDirection::Down));
        }
        assert!(cycler.cycle_debounced(WheelDirection::Down));
        assert_eq!(cycler.raw_depth(), 1);
    }

    #[test]
    fn test_direction_change_resets_counter() {
        let mut cycler = SelectionCycler::default();
        for _ in 0..4 {
            cycler.cycle_debounced(WheelDirection::Down);
        }
        // One tick up throws away the four down ticks
        assert!(!cycler.cycle_debounced(WheelDirection::Up));
        for _ in 0..4 {
            assert!(!cycler.cycle_debounced(WheelDirection::Down));
        }
        assert!(cycler.cycle_debounced(WheelDirection::Down));
        assert_eq!(cycler.raw_depth(), 1);
    }

    #[test]
    fn test_settle() {
        let mut cycler = SelectionCycler::new(2);
        cycler.cycle(-3);
        cycler.settle(4);
        assert_eq!(cycler.raw_depth(), 0);
        cycler.cycle_debounced(WheelDirection::Down);
        assert!(cycler.cycle_debounced(WheelDirection::Down));
        assert_eq!(cycler.raw_depth(), 1);
    }
}
