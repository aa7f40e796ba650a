//! Hand-off of body positions to a renderer
//!
//! The renderer only ever sees positions. A [`PositionView`] borrows the
//! simulation, so it cannot outlive the frame it was taken in: the next tick
//! needs `&mut Simulation` and the borrow checker ends the view first.

use glam::Vec2;

#[derive(Debug, Clone, Copy)]
pub struct PositionView<'a> {
    positions: &'a [Vec2],
}

impl<'a> PositionView<'a> {
    pub fn new(positions: &'a [Vec2]) -> Self {
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn as_slice(&self) -> &'a [Vec2] {
        self.positions
    }

    /// Positions as `x0, y0, x1, y1, ...` ready for a vertex buffer upload.
    pub fn as_interleaved(&self) -> &'a [f32] {
        bytemuck::cast_slice(self.positions)
    }

    /// Raw bytes of the interleaved buffer.
    pub fn as_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }

    /// Point size hint that shrinks as the cloud gets denser.
    pub fn point_size(&self) -> f32 {
        10.0 / (1.0 + (self.len().max(1) as f32).log10())
    }

    /// Axis-aligned bounds of the cloud, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_interleaved_layout() {
        let positions = [Vec2::new(1.0, 2.0), Vec2::new(-3.0, 4.5)];
        let view = PositionView::new(&positions);

        assert_eq!(view.len(), 2);
        assert_eq!(view.as_interleaved(), &[1.0, 2.0, -3.0, 4.5]);
        assert_eq!(view.as_bytes().len(), 4 * std::mem::size_of::<f32>());
    }

    #[test]
    fn test_point_size_shrinks_with_count() {
        let one = [Vec2::ZERO];
        let hundred = [Vec2::ZERO; 100];
        assert_relative_eq!(PositionView::new(&one).point_size(), 10.0);
        assert_relative_eq!(PositionView::new(&hundred).point_size(), 10.0 / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_bounds() {
        let positions = [Vec2::new(1.0, -2.0), Vec2::new(-3.0, 4.0), Vec2::new(0.5, 0.5)];
        let (lo, hi) = PositionView::new(&positions).bounds().unwrap();
        assert_eq!(lo, Vec2::new(-3.0, -2.0));
        assert_eq!(hi, Vec2::new(1.0, 4.0));
        assert!(PositionView::new(&[]).bounds().is_none());
    }
}
