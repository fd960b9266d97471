//! Package definitions and pin allocation for the bondout pin allocator.
//!
//! A package definition describes the physical pin universe of a package,
//! the bringup pins that sit at a fixed location on every build, and the
//! canonical ordering used to hand out the remaining pins. Four families are
//! provided:
//!
//! - [`QuadPackage`]: perimeter-numbered QFN/QFP/PGA packages
//! - [`BareDiePackage`]: pads on the four sides of a bare die
//! - [`GridArrayPackage`]: BGA/PGA arrays with several population layouts
//! - [`OpenframePackage`]: the Openframe carrier, a literal pin table
//!
//! [`PackageDef`] is the closed sum over these families. It is what lock files
//! store, tagged by a `package_type` field.
//!
//! ```
//! use bondout_package::{load_package, PackageDefinition};
//!
//! let pkg = load_package("pga144").unwrap();
//! assert_eq!(pkg.pins().len(), 144);
//! ```

#![warn(missing_docs)]

pub mod bare_die;
pub mod bringup;
pub mod contiguous;
pub mod error;
pub mod grid_array;
pub mod openframe;
pub mod pin;
pub mod quad;

pub use bare_die::{BareDiePackage, BareDieParams};
pub use bringup::{BringupPins, JtagPins, PowerPins};
pub use contiguous::allocate_contiguous;
pub use error::PackageError;
pub use grid_array::{GridArrayPackage, GridArrayParams, LayoutType};
pub use openframe::OpenframePackage;
pub use pin::{CarrierKind, CarrierPin, GridPin, Pin, Side};
pub use quad::{QuadPackage, QuadParams};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The contract every package family implements.
///
/// Implementations compute their ordering once at construction and are
/// immutable afterwards.
pub trait PackageDefinition {
    /// The package name (e.g. `"pga144"`).
    fn name(&self) -> &str;

    /// Every addressable pin of the package, bringup pins included.
    fn pins(&self) -> BTreeSet<Pin>;

    /// The fixed bringup pins. Identical on every call for the same package.
    fn bringup_pins(&self) -> BringupPins;

    /// The pins available for allocation, in allocation order.
    ///
    /// Never contains a bringup pin.
    fn ordered_pins(&self) -> &[Pin];

    /// Interprets a user-written pin location in this family's notation,
    /// without checking that the pin exists.
    fn parse_location(&self, location: &str) -> Option<Pin>;

    /// Parses a user-written pin location and checks it names a pin of this package.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::UnknownPin`] if the location does not parse or
    /// is outside the package.
    fn parse_pin(&self, location: &str) -> Result<Pin, PackageError> {
        self.parse_location(location)
            .filter(|pin| self.pins().contains(pin))
            .ok_or_else(|| PackageError::UnknownPin {
                package: self.name().to_string(),
                location: location.to_string(),
            })
    }

    /// Allocates `width` pins from `available`, preferring pins that are
    /// adjacent in [`ordered_pins`](Self::ordered_pins).
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::UnableToAllocate`] if `available` holds fewer
    /// than `width` allocatable pins.
    fn allocate(&self, available: &BTreeSet<Pin>, width: usize) -> Result<Vec<Pin>, PackageError> {
        let pins = allocate_contiguous(self.ordered_pins(), available, width)?;
        log::debug!(
            "{}: allocated {} of {} remaining pins",
            self.name(),
            pins.len(),
            available.len()
        );
        Ok(pins)
    }
}

/// A package definition of any supported family.
///
/// Serialized as the family's construction parameters plus a `package_type`
/// discriminator, so a lock file round-trips to the right variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "package_type")]
pub enum PackageDef {
    /// A quad perimeter package.
    #[serde(rename = "QuadPackageDef")]
    Quad(QuadPackage),
    /// A bare die.
    #[serde(rename = "BareDiePackageDef")]
    BareDie(BareDiePackage),
    /// A grid array.
    #[serde(rename = "GAPackageDef")]
    GridArray(GridArrayPackage),
    /// The Openframe carrier.
    #[serde(rename = "OpenframePackageDef")]
    Openframe(OpenframePackage),
}

impl PackageDef {
    /// Returns the discriminator written to lock files.
    pub fn package_type(&self) -> &'static str {
        match self {
            PackageDef::Quad(_) => "QuadPackageDef",
            PackageDef::BareDie(_) => "BareDiePackageDef",
            PackageDef::GridArray(_) => "GAPackageDef",
            PackageDef::Openframe(_) => "OpenframePackageDef",
        }
    }

    fn inner(&self) -> &dyn PackageDefinition {
        match self {
            PackageDef::Quad(p) => p,
            PackageDef::BareDie(p) => p,
            PackageDef::GridArray(p) => p,
            PackageDef::Openframe(p) => p,
        }
    }
}

impl PackageDefinition for PackageDef {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn pins(&self) -> BTreeSet<Pin> {
        self.inner().pins()
    }

    fn bringup_pins(&self) -> BringupPins {
        self.inner().bringup_pins()
    }

    fn ordered_pins(&self) -> &[Pin] {
        self.inner().ordered_pins()
    }

    fn parse_location(&self, location: &str) -> Option<Pin> {
        self.inner().parse_location(location)
    }

    fn allocate(&self, available: &BTreeSet<Pin>, width: usize) -> Result<Vec<Pin>, PackageError> {
        self.inner().allocate(available, width)
    }
}

/// Names accepted by [`load_package`].
pub const KNOWN_PACKAGES: [&str; 4] = ["bga144", "cf20", "openframe", "pga144"];

/// Looks up a predefined package by name.
///
/// # Errors
///
/// Returns [`PackageError::UnknownPackage`] if no package is registered
/// under `name`.
pub fn load_package(name: &str) -> Result<PackageDef, PackageError> {
    match name {
        "pga144" => Ok(PackageDef::Quad(QuadPackage::new(name, 36, 36)?)),
        "cf20" => Ok(PackageDef::BareDie(BareDiePackage::new(name, 7, 3)?)),
        "bga144" => Ok(PackageDef::GridArray(GridArrayPackage::new(
            GridArrayParams::full(name, 12, 12),
        )?)),
        "openframe" => Ok(PackageDef::Openframe(OpenframePackage::new(name))),
        _ => Err(PackageError::UnknownPackage {
            name: name.to_string(),
            known: KNOWN_PACKAGES.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_packages_load() {
        for name in KNOWN_PACKAGES {
            let pkg = load_package(name).unwrap();
            assert_eq!(pkg.name(), name);
            let bringup = pkg.bringup_pins().to_set();
            assert!(pkg.ordered_pins().iter().all(|p| !bringup.contains(p)));
            assert!(bringup.is_subset(&pkg.pins()));
        }
    }

    #[test]
    fn unknown_package() {
        let err = load_package("qfn99").unwrap_err();
        assert!(matches!(err, PackageError::UnknownPackage { ref name, .. } if name == "qfn99"));
    }

    #[test]
    fn tagged_serde_roundtrip() {
        for name in KNOWN_PACKAGES {
            let pkg = load_package(name).unwrap();
            let json = serde_json::to_string(&pkg).unwrap();
            assert!(json.contains(&format!("\"package_type\":\"{}\"", pkg.package_type())));
            let back: PackageDef = serde_json::from_str(&json).unwrap();
            assert_eq!(back, pkg);
        }
    }

    #[test]
    fn quad_json_shape() {
        let pkg = PackageDef::Quad(QuadPackage::new("qfn32", 8, 8).unwrap());
        let json = serde_json::to_string(&pkg).unwrap();
        assert_eq!(
            json,
            r#"{"package_type":"QuadPackageDef","name":"qfn32","width":8,"height":8}"#
        );
    }

    #[test]
    fn bringup_is_stable() {
        let a = load_package("pga144").unwrap().bringup_pins();
        let b = load_package("pga144").unwrap().bringup_pins();
        assert_eq!(a, b);
    }

    #[test]
    fn allocate_removes_nothing_from_input() {
        let pkg = load_package("pga144").unwrap();
        let pool: BTreeSet<Pin> = pkg.ordered_pins().iter().cloned().collect();
        let got = pkg.allocate(&pool, 4).unwrap();
        assert_eq!(got.len(), 4);
        assert_eq!(got[0], pkg.ordered_pins()[0]);
        assert_eq!(pool.len(), pkg.ordered_pins().len());
    }

    #[test]
    fn invalid_inline_package_fails_to_deserialize() {
        let json = r#"{"package_type":"QuadPackageDef","name":"x","width":3,"height":3}"#;
        assert!(serde_json::from_str::<PackageDef>(json).is_err());
    }
}
