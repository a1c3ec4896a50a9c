use num_traits::Float;
use std::ops::Mul;

use super::Vector;

impl<T: Float, const N: usize> Mul<T> for Vector<T, N> {
  type Output = Vector<T, N>;

  fn mul(self: Vector<T, N>, other: T) -> Self::Output {
    self.scale(other)
  }
}
