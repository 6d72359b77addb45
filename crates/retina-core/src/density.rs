#![forbid(unsafe_code)]

//! Environment density: the display's device pixel ratio rounded to an
//! integer factor.
//!
//! The density is read once when the configuration is built and never
//! re-read; a page that moves to another monitor keeps its initial factor.

use core::fmt;
use core::num::NonZeroU32;

use crate::host::Host;

/// Integer display density (`1` = standard, `2` = retina, `3` = super-retina).
///
/// Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Density(NonZeroU32);

impl Density {
    /// Standard-resolution display.
    pub const STANDARD: Self = Self(NonZeroU32::MIN);

    /// Create a density from an integer factor. Returns `None` for 0.
    #[must_use]
    pub const fn new(factor: u32) -> Option<Self> {
        match NonZeroU32::new(factor) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// Round a raw pixel ratio into a density.
    ///
    /// A missing, zero, negative, or non-finite ratio counts as 1, as does
    /// anything that rounds below 1 (e.g. `0.4` on a zoomed-out page).
    /// Halves round up: `1.5` → 2.
    #[must_use]
    pub fn from_pixel_ratio(ratio: Option<f64>) -> Self {
        let ratio = match ratio {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => return Self::STANDARD,
        };
        let rounded = (ratio + 0.5).floor();
        if rounded >= f64::from(u32::MAX) {
            return Self(NonZeroU32::MAX);
        }
        Self::new(rounded as u32).unwrap_or(Self::STANDARD)
    }

    /// Read the host's pixel ratio and round it.
    ///
    /// Hosts without a windowing context report no ratio and land on 1.
    #[must_use]
    pub fn detect<H: Host + ?Sized>(host: &H) -> Self {
        Self::from_pixel_ratio(host.device_pixel_ratio())
    }

    /// The integer factor.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Whether this environment benefits from high-resolution assets.
    #[inline]
    #[must_use]
    pub const fn is_high_density(self) -> bool {
        self.0.get() > 1
    }
}

impl Default for Density {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ratio_is_standard() {
        assert_eq!(Density::from_pixel_ratio(None), Density::STANDARD);
    }

    #[test]
    fn falsy_ratios_are_standard() {
        for ratio in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert_eq!(Density::from_pixel_ratio(Some(ratio)).get(), 1, "{ratio}");
        }
    }

    #[test]
    fn ratios_round_half_up() {
        assert_eq!(Density::from_pixel_ratio(Some(1.0)).get(), 1);
        assert_eq!(Density::from_pixel_ratio(Some(1.25)).get(), 1);
        assert_eq!(Density::from_pixel_ratio(Some(1.5)).get(), 2);
        assert_eq!(Density::from_pixel_ratio(Some(2.0)).get(), 2);
        assert_eq!(Density::from_pixel_ratio(Some(2.625)).get(), 3);
    }

    #[test]
    fn small_ratio_never_drops_below_one() {
        assert_eq!(Density::from_pixel_ratio(Some(0.4)).get(), 1);
    }

    #[test]
    fn high_density_threshold() {
        assert!(!Density::STANDARD.is_high_density());
        assert!(Density::new(2).unwrap().is_high_density());
        assert!(Density::new(0).is_none());
    }

    #[test]
    fn display_appends_x() {
        assert_eq!(Density::new(3).unwrap().to_string(), "3x");
    }
}
