use array_init::array_init;
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::ops::Index;

/// Fixed-size arithmetic vector. Every operation returns a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Vector<T, const N: usize>(pub [T; N]);

impl<T, const N: usize> Distribution<Vector<T, N>> for Standard
where
  Standard: Distribution<T>,
{
  fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vector<T, N> {
    Vector(array_init(|_| rng.gen()))
  }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
  type Output = T;
  fn index(&self, index: usize) -> &T {
    self.0.index(index)
  }
}

impl<T: Float, const N: usize> Vector<T, N> {
  pub fn zero() -> Vector<T, N> {
    Vector([T::zero(); N])
  }

  /// Small fixed offset used wherever a direction is needed but the length is zero.
  pub fn epsilon() -> Vector<T, N> {
    Vector([epsilon_component(); N])
  }

  /// Uniformly random vector in the box `[-extent, extent]^N`.
  pub fn random_in_box<R>(extent: T, rng: &mut R) -> Vector<T, N>
  where
    T: SampleUniform,
    R: Rng + ?Sized,
  {
    if extent <= T::zero() {
      return Vector::zero();
    }
    Vector(array_init(|_| rng.gen_range(-extent..extent)))
  }

  pub fn scale(&self, k: T) -> Vector<T, N> {
    Vector(array_init(|i| self.0[i] * k))
  }

  pub fn dot(&self, other: &Vector<T, N>) -> T {
    self
      .0
      .iter()
      .zip(other.0.iter())
      .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
  }

  pub fn squared_length(&self) -> T {
    self.dot(self)
  }

  pub fn length(&self) -> T {
    self.squared_length().sqrt()
  }

  /// Same direction, length `k`. A zero vector has no direction and yields
  /// [`Vector::epsilon`] instead.
  pub fn scale_to(&self, k: T) -> Vector<T, N> {
    let len = self.length();
    if len == T::zero() {
      return Vector::epsilon();
    }
    self.scale(k / len)
  }

  pub fn normalize(&self) -> Vector<T, N> {
    self.scale_to(T::one())
  }

  /// Shrinks the vector to length `cap` if it is longer.
  pub fn cap(&self, cap: T) -> Vector<T, N> {
    if self.length() > cap {
      self.scale_to(cap)
    } else {
      *self
    }
  }

  pub fn is_finite(&self) -> bool {
    self.0.iter().all(|c| c.is_finite())
  }
}

fn epsilon_component<T: Float>() -> T {
  <T as num_traits::NumCast>::from(0.0001).unwrap_or_else(T::epsilon)
}

impl<T: Float> Vector<T, 2> {
  pub fn new(x: T, y: T) -> Vector<T, 2> {
    Vector([x, y])
  }

  /// Counter-clockwise rotation by `angle` radians.
  pub fn rotate(&self, angle: T) -> Vector<T, 2> {
    let (sin, cos) = angle.sin_cos();
    let [x, y] = self.0;
    Vector([x * cos - y * sin, x * sin + y * cos])
  }

  /// Z component of the 3D cross product. Positive when `other` is counter-clockwise of `self`.
  pub fn perp_dot(&self, other: &Vector<T, 2>) -> T {
    self.0[0] * other.0[1] - self.0[1] * other.0[0]
  }

  /// `self` rotated a quarter turn clockwise.
  pub fn right_normal(&self) -> Vector<T, 2> {
    Vector([self.0[1], -self.0[0]])
  }
}

impl<T: Float> Vector<T, 3> {
  pub fn cross(&self, other: &Vector<T, 3>) -> Vector<T, 3> {
    let [ax, ay, az] = self.0;
    let [bx, by, bz] = other.0;
    Vector([ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx])
  }
}

mod add;
mod div;
mod mul;
mod sub;

impl<T: Float, const N: usize> std::iter::Sum for Vector<T, N> {
  fn sum<I>(iter: I) -> Vector<T, N>
  where
    I: Iterator<Item = Vector<T, N>>,
  {
    iter.fold(Vector::zero(), |acc, vec| acc + vec)
  }
}

impl<T: Float, const N: usize> std::ops::Neg for Vector<T, N> {
  type Output = Self;
  fn neg(self) -> Self {
    Vector(array_init(|i| -self.0[i]))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use proptest::prelude::*;
  use rand::SeedableRng;
  use test_strategy::proptest;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  #[test]
  fn arithmetic() {
    let a = Vector::new(1.0, 2.0);
    let b = Vector::new(3.0, -1.0);
    assert_eq!(a + b, Vector::new(4.0, 1.0));
    assert_eq!(a - b, Vector::new(-2.0, 3.0));
    assert_eq!(a * 2.0, Vector::new(2.0, 4.0));
    assert_eq!(a / 2.0, Vector::new(0.5, 1.0));
    assert_eq!(-a, Vector::new(-1.0, -2.0));
    assert!(close(a.dot(&b), 1.0));
    assert!(close(Vector::new(3.0, 4.0).length(), 5.0));
  }

  #[test]
  fn scale_to_zero_is_epsilon() {
    let zero: Vector<f64, 2> = Vector::zero();
    assert_eq!(zero.scale_to(1.0), Vector::epsilon());
    assert_eq!(zero.normalize(), Vector::epsilon());
  }

  #[test]
  fn rotate_quarter_turn() {
    let v = Vector::new(1.0, 0.0).rotate(std::f64::consts::FRAC_PI_2);
    assert!(close(v[0], 0.0));
    assert!(close(v[1], 1.0));
    assert!(close(Vector::new(1.0, 0.0).perp_dot(&v), 1.0));
  }

  #[test]
  fn cross_of_axes() {
    let x = Vector([1.0, 0.0, 0.0]);
    let y = Vector([0.0, 1.0, 0.0]);
    assert_eq!(x.cross(&y), Vector([0.0, 0.0, 1.0]));
    assert_eq!(y.cross(&x), Vector([0.0, 0.0, -1.0]));
  }

  #[test]
  fn random_in_box_is_bounded() {
    let mut rng = rand::rngs::SmallRng::seed_from_u64(3);
    for _ in 0..100 {
      let v: Vector<f64, 3> = Vector::random_in_box(2.0, &mut rng);
      assert!(v.0.iter().all(|c| c.abs() <= 2.0));
    }
  }

  #[proptest]
  fn scale_to_has_requested_length(
    #[strategy(-1e3..1e3_f64)] x: f64,
    #[strategy(-1e3..1e3_f64)] y: f64,
    #[strategy(0.1..10.0_f64)] k: f64,
  ) {
    prop_assume!(x.abs() > 1e-6 || y.abs() > 1e-6);
    let v = Vector::new(x, y).scale_to(k);
    prop_assert!((v.length() - k).abs() < 1e-9);
  }

  #[proptest]
  fn cap_never_exceeds(
    #[strategy(-1e3..1e3_f64)] x: f64,
    #[strategy(-1e3..1e3_f64)] y: f64,
  ) {
    let v = Vector::new(x, y).cap(0.5);
    prop_assert!(v.length() <= 0.5 + 1e-12);
  }
}
