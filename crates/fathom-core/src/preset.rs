//! Damping presets — the (d, r) coefficient pairs that govern air absorption
//! and wall reflectivity.
//!
//! Modeled as a closed tagged union rather than an open trait hierarchy: the
//! stepper branches on [`PresetKind`] once per frame (to pick a display
//! label / preset identity) and on [`DampingPreset::is_absorbing`] once per
//! boundary sweep. There is deliberately no room for a fifth preset kind
//! without touching this enum — see spec design notes on polymorphism.

/// Named kind of a [`DampingPreset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresetKind {
    /// Realistic room acoustics: light air damping, mostly reflective walls.
    #[default]
    Realistic,
    /// No damping, fully reflective — for visualizing clean wave fronts.
    Visualization,
    /// Near-total absorption at the walls, light air damping.
    Anechoic,
    /// User-supplied coefficients.
    Custom,
}

/// A damping preset: per-step air energy retention `d` and wall reflection
/// coefficient `r`.
///
/// # Invariant
///
/// `r < 0.1` selects the absorbing (Engquist-Majda) boundary branch in the
/// stepper; otherwise the reflective branch is used. See
/// [`DampingPreset::is_absorbing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampingPreset {
    kind: PresetKind,
    /// Per-step energy retention of the air, in `(0, 1]`.
    pub d: f32,
    /// Wall reflection coefficient, in `[0, 1]`.
    pub r: f32,
}

impl DampingPreset {
    /// Realistic room acoustics: `d = 0.997`, `r = 0.85`.
    pub const fn realistic() -> Self {
        Self {
            kind: PresetKind::Realistic,
            d: 0.997,
            r: 0.85,
        }
    }

    /// No damping, fully reflective walls: `d = 1.0`, `r = 1.0`.
    pub const fn visualization() -> Self {
        Self {
            kind: PresetKind::Visualization,
            d: 1.0,
            r: 1.0,
        }
    }

    /// Near-anechoic room: `d = 0.995`, `r = 0.0` (absorbing walls).
    pub const fn anechoic() -> Self {
        Self {
            kind: PresetKind::Anechoic,
            d: 0.995,
            r: 0.0,
        }
    }

    /// A user-supplied `(d, r)` pair, tagged [`PresetKind::Custom`].
    ///
    /// Values are not clamped here — out-of-range coefficients are a
    /// modeling choice the caller is allowed to make (e.g. `d > 1` to study
    /// instability), but production callers should keep `d` in `(0, 1]` and
    /// `r` in `[0, 1]` per the invariants in the field's numerical contract.
    pub const fn custom(d: f32, r: f32) -> Self {
        Self {
            kind: PresetKind::Custom,
            d,
            r,
        }
    }

    /// The named kind this preset was constructed as.
    pub const fn kind(&self) -> PresetKind {
        self.kind
    }

    /// `true` when the absorbing (Engquist-Majda one-way ABC) boundary
    /// branch applies, i.e. `r < 0.1`. Otherwise the reflective branch
    /// applies.
    #[inline]
    pub fn is_absorbing(&self) -> bool {
        self.r < 0.1
    }

    /// `2 * d`, the coefficient the leapfrog update multiplies the
    /// Laplacian term and the previous-state term by.
    #[inline]
    pub fn two_d(&self) -> f32 {
        2.0 * self.d
    }
}

impl Default for DampingPreset {
    fn default() -> Self {
        Self::realistic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realistic_matches_spec_constants() {
        let p = DampingPreset::realistic();
        assert!((p.d - 0.997).abs() < 1e-6);
        assert!((p.r - 0.85).abs() < 1e-6);
        assert!(!p.is_absorbing());
    }

    #[test]
    fn anechoic_is_exactly_zero_reflection_and_absorbing() {
        let p = DampingPreset::anechoic();
        assert_eq!(p.r, 0.0);
        assert!(p.is_absorbing());
    }

    #[test]
    fn visualization_has_no_damping_and_is_fully_reflective() {
        let p = DampingPreset::visualization();
        assert_eq!(p.d, 1.0);
        assert_eq!(p.r, 1.0);
        assert!(!p.is_absorbing());
    }

    #[test]
    fn reflective_boundary_is_r_at_or_above_tenth() {
        let p = DampingPreset::custom(0.99, 0.1);
        assert!(!p.is_absorbing());
        let p = DampingPreset::custom(0.99, 0.099);
        assert!(p.is_absorbing());
    }

    #[test]
    fn two_d_is_double_d() {
        let p = DampingPreset::custom(0.9, 0.5);
        assert!((p.two_d() - 1.8).abs() < 1e-6);
    }
}
