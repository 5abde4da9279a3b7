//! Opacity multiplier stack.
//!
//! Tracked so that nested paint passes can scope an opacity, but drawing does
//! not blend with it yet: cells are written with their colors unchanged.

/// Stack of opacity values that multiply together.
#[derive(Clone, Debug)]
pub struct OpacityStack {
    saved: Vec<f32>,
    current: f32,
}

impl OpacityStack {
    #[must_use]
    pub fn new() -> Self {
        Self {
            saved: Vec::new(),
            current: 1.0,
        }
    }

    /// Scope a new multiplier; the effective value is the running product.
    pub fn push(&mut self, opacity: f32) {
        self.saved.push(self.current);
        self.current *= opacity.clamp(0.0, 1.0);
    }

    /// Restore the value before the last push (1.0 when nothing is pushed).
    pub fn pop(&mut self) {
        self.current = self.saved.pop().unwrap_or(1.0);
    }

    pub fn clear(&mut self) {
        self.saved.clear();
        self.current = 1.0;
    }

    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }
}

impl Default for OpacityStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_multiplies_and_pop_restores() {
        let mut s = OpacityStack::new();
        s.push(0.8);
        s.push(0.5);
        assert!((s.current() - 0.4).abs() < 1e-6);
        assert_eq!(s.depth(), 2);

        s.pop();
        assert!((s.current() - 0.8).abs() < 1e-6);
        s.pop();
        assert!((s.current() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let mut s = OpacityStack::new();
        s.push(2.0);
        assert!((s.current() - 1.0).abs() < 1e-6);
        s.push(-1.0);
        assert!(s.current().abs() < 1e-6);
    }

    #[test]
    fn test_pop_empty_is_opaque() {
        let mut s = OpacityStack::default();
        s.pop();
        s.pop();
        assert!((s.current() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clear() {
        let mut s = OpacityStack::new();
        for _ in 0..10 {
            s.push(0.5);
        }
        s.clear();
        assert_eq!(s.depth(), 0);
        assert!((s.current() - 1.0).abs() < 1e-6);
    }
}
