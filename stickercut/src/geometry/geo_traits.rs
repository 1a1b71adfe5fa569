use crate::geometry::Matrix;

/// Trait for types that can be modified by an affine [`Matrix`].
pub trait Transformable: Clone {
    /// Applies a transformation to `self`.
    fn transform(&mut self, m: &Matrix) -> &mut Self;

    /// Applies a transformation to a clone.
    fn transform_clone(&self, m: &Matrix) -> Self {
        let mut clone = self.clone();
        clone.transform(m);
        clone
    }
}
