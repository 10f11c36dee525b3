//! Error types for field and source-pool operations.

/// Errors produced by [`crate::field::Field`] mutations.
///
/// All variants are reported as diagnostics by the caller; the field itself
/// is never left partially mutated by a rejected operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A radius argument fell outside the accepted `[1, 50]` pixel range.
    InvalidRadius {
        /// The rejected radius.
        radius: i32,
    },
    /// An impulse amplitude fell outside the accepted `(0, 1000]` pascal range.
    InvalidAmplitude {
        /// The rejected amplitude, in pascals.
        pressure: f32,
    },
    /// `load_obstacles_from_mask` received a mask whose length did not match
    /// `width * height`.
    MaskSizeMismatch {
        /// Expected mask length (`width * height`).
        expected: usize,
        /// Actual mask length supplied by the caller.
        actual: usize,
    },
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FieldError::InvalidRadius { radius } => {
                write!(f, "radius {radius} out of range [1, 50]")
            }
            FieldError::InvalidAmplitude { pressure } => {
                write!(f, "amplitude {pressure} Pa out of range (0, 1000]")
            }
            FieldError::MaskSizeMismatch { expected, actual } => {
                write!(f, "obstacle mask length {actual} does not match grid size {expected}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FieldError {}
