//! Pairwise gravitational acceleration
//!
//! The pull of body `j` on body `i` is aimed at the mass-weighted center of
//! the pair rather than at `j` itself, and its magnitude uses the distance
//! from `i` to that center:
//!
//! ```text
//! com = (p_i * m_i + p_j * m_j) / (m_i + m_j)
//! d   = |com - p_i|
//! a  += normalize(com - p_i) * G * m_i * m_j / (d^2 + softening)
//! ```
//!
//! This is not textbook Newtonian gravity and does not conserve momentum for
//! unequal masses.

use glam::Vec2;

/// Constants of the force law
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub g: f32,
    pub softening: f32,
}

impl Gravity {
    pub fn new(g: f32, softening: f32) -> Self {
        Self { g, softening }
    }

    /// Contribution of body `j` to the acceleration of body `i`.
    #[inline]
    pub fn pair_acceleration(&self, p_i: Vec2, m_i: f32, p_j: Vec2, m_j: f32) -> Vec2 {
        let com = (p_i * m_i + p_j * m_j) / (m_i + m_j);
        let offset = com - p_i;
        let d_sq = offset.length_squared();

        // Coincident centers have no direction; contribute nothing.
        offset.normalize_or_zero() * self.g * m_i * m_j / (d_sq + self.softening)
    }

    /// Net acceleration on body `i` from every other body in the snapshot.
    ///
    /// `positions` and `masses` must have the same length and `i` must be in
    /// range. Body `i` is skipped, so a single body gets zero.
    pub fn evaluate_acceleration(&self, i: usize, positions: &[Vec2], masses: &[f32]) -> Vec2 {
        debug_assert_eq!(positions.len(), masses.len());

        let p_i = positions[i];
        let m_i = masses[i];

        positions
            .iter()
            .zip(masses)
            .enumerate()
            .filter(|&(j, _)| j != i)
            .fold(Vec2::ZERO, |acc, (_, (&p_j, &m_j))| {
                acc + self.pair_acceleration(p_i, m_i, p_j, m_j)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_body_feels_nothing() {
        let gravity = Gravity::new(1.0, 0.1);
        let a = gravity.evaluate_acceleration(0, &[Vec2::new(3.0, 4.0)], &[10.0]);
        assert_eq!(a, Vec2::ZERO);
    }

    #[test]
    fn test_pair_matches_center_of_mass_formula() {
        let gravity = Gravity::new(2.0, 0.5);
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0)];
        let masses = [1.0, 3.0];

        // com = (0*1 + 4*3) / 4 = 3, so d = 3 along +x
        let expected = 2.0 * 1.0 * 3.0 / (9.0 + 0.5);
        let a0 = gravity.evaluate_acceleration(0, &positions, &masses);
        assert_relative_eq!(a0.x, expected, epsilon = 1e-6);
        assert_relative_eq!(a0.y, 0.0);

        // From body 1 the com is 1 unit away along -x
        let expected = 2.0 * 1.0 * 3.0 / (1.0 + 0.5);
        let a1 = gravity.evaluate_acceleration(1, &positions, &masses);
        assert_relative_eq!(a1.x, -expected, epsilon = 1e-6);
    }

    #[test]
    fn test_equal_masses_are_antisymmetric() {
        let gravity = Gravity::new(1e-3, 1.0);
        let positions = [Vec2::new(-2.0, 1.0), Vec2::new(2.0, -1.0)];
        let masses = [5.0, 5.0];

        let a0 = gravity.evaluate_acceleration(0, &positions, &masses);
        let a1 = gravity.evaluate_acceleration(1, &positions, &masses);
        assert_relative_eq!(a0.x, -a1.x, epsilon = 1e-9);
        assert_relative_eq!(a0.y, -a1.y, epsilon = 1e-9);
    }

    #[test]
    fn test_contributions_sum_over_all_others() {
        let gravity = Gravity::new(1.0, 1.0);
        let positions = [Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)];
        let masses = [1.0, 1.0, 1.0];

        let a = gravity.evaluate_acceleration(0, &positions, &masses);
        let single = gravity.pair_acceleration(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0);
        assert_relative_eq!(a.x, single.x, epsilon = 1e-6);
        assert_relative_eq!(a.y, single.x, epsilon = 1e-6);
    }

    #[test]
    fn test_coincident_bodies_stay_finite() {
        let gravity = Gravity::new(1.0, 1.0);
        let positions = [Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)];
        let a = gravity.evaluate_acceleration(0, &positions, &[2.0, 2.0]);
        assert!(a.is_finite());
        assert_eq!(a, Vec2::ZERO);
    }

    #[test]
    fn test_softening_bounds_close_range_magnitude() {
        let gravity = Gravity::new(1.0, 0.25);
        let a = gravity.pair_acceleration(Vec2::ZERO, 1.0, Vec2::new(1e-4, 0.0), 1.0);
        assert!(a.length() <= 1.0 / 0.25 + 1e-3);
    }
}
