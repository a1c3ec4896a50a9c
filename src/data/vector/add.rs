use array_init::array_init;
use num_traits::Float;
use std::ops::Add;
use std::ops::AddAssign;

use super::Vector;

impl<T: Float, const N: usize> Add<Vector<T, N>> for Vector<T, N> {
  type Output = Vector<T, N>;

  fn add(self: Vector<T, N>, other: Vector<T, N>) -> Self::Output {
    Vector(array_init(|i| self.0[i] + other.0[i]))
  }
}

impl<T: Float, const N: usize> AddAssign<Vector<T, N>> for Vector<T, N> {
  fn add_assign(&mut self, other: Vector<T, N>) {
    *self = *self + other
  }
}
