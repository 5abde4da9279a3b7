//! Scissor (clipping) rectangle stack.

/// A clipping rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    /// Create a new clipping rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside this rectangle.
    #[must_use]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        if px < self.x || py < self.y {
            return false;
        }
        // Handle large dimensions to avoid i32 overflow
        let x_end = self.x.saturating_add_unsigned(self.width);
        let y_end = self.y.saturating_add_unsigned(self.height);
        px < x_end && py < y_end
    }
}

/// Stack of scissor rectangles.
///
/// Only the topmost rectangle is tested. A nested push does not intersect
/// with the rectangles below it, so callers that want a tighter clip must
/// push the already-intersected region themselves.
#[derive(Clone, Debug, Default)]
pub struct ScissorStack {
    stack: Vec<ClipRect>,
}

impl ScissorStack {
    #[must_use]
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, rect: ClipRect) {
        self.stack.push(rect);
    }

    /// Pop the top scissor rectangle. Popping an empty stack is a no-op.
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Check if a point passes the active rectangle (always true when empty).
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.stack.last().is_none_or(|rect| rect.contains(x, y))
    }

    #[must_use]
    pub fn current(&self) -> Option<ClipRect> {
        self.stack.last().copied()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
