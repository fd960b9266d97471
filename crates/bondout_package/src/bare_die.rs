//! Bare-die packages: pads on four sides of an unpackaged die.

use crate::bringup::{BringupPins, JtagPins, PowerPins};
use crate::error::PackageError;
use crate::pin::{parse_die_pin, Pin, Side};
use crate::PackageDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Construction parameters of a bare-die package, as stored in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BareDieParams {
    /// Package name.
    pub name: String,
    /// Pads on the north and south sides.
    pub width: u32,
    /// Pads on the east and west sides.
    pub height: u32,
}

/// A die with `width` pads on the N and S sides and `height` pads on the E
/// and W sides. Pads are offset from 0 across or down from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BareDieParams", into = "BareDieParams")]
pub struct BareDiePackage {
    name: String,
    width: u32,
    height: u32,
    ordered: Vec<Pin>,
}

impl BareDiePackage {
    /// Creates a bare-die package.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidDimensions`] if the N side has fewer
    /// than 4 pads or the E/W sides fewer than 3.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Result<Self, PackageError> {
        let name = name.into();
        if width < 4 || height < 3 {
            return Err(PackageError::InvalidDimensions {
                package: name,
                reason: format!("bare die needs at least 4x3 pads, got {width}x{height}"),
            });
        }

        let reserved = die_bringup(height).to_set();
        let ordered = die_pins(width, height)
            .into_iter()
            .filter(|p| !reserved.contains(p))
            .collect();

        Ok(Self {
            name,
            width,
            height,
            ordered,
        })
    }
}

fn die_pins(width: u32, height: u32) -> BTreeSet<Pin> {
    Side::ALL
        .into_iter()
        .flat_map(|side| {
            let len = match side {
                Side::N | Side::S => width,
                Side::E | Side::W => height,
            };
            (0..len).map(move |offset| Pin::Die(side, offset))
        })
        .collect()
}

fn die_bringup(height: u32) -> BringupPins {
    let core_jtag = (height >= 7).then(|| {
        JtagPins::from_consecutive([2, 3, 4, 5, 6].map(|offset| Pin::Die(Side::E, offset)))
    });

    BringupPins {
        core_power: vec![
            PowerPins::new(Pin::Die(Side::N, 1), Pin::Die(Side::N, 2)),
            PowerPins::named(Pin::Die(Side::W, 1), Pin::Die(Side::W, 2), "d"),
        ],
        core_clock: Pin::Die(Side::N, 3),
        core_reset: Pin::Die(Side::N, 0),
        core_heartbeat: Pin::Die(Side::E, 1),
        core_jtag,
    }
}

impl PackageDefinition for BareDiePackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn pins(&self) -> BTreeSet<Pin> {
        die_pins(self.width, self.height)
    }

    fn bringup_pins(&self) -> BringupPins {
        die_bringup(self.height)
    }

    fn ordered_pins(&self) -> &[Pin] {
        &self.ordered
    }

    fn parse_location(&self, location: &str) -> Option<Pin> {
        parse_die_pin(location).ok()
    }
}

impl TryFrom<BareDieParams> for BareDiePackage {
    type Error = PackageError;

    fn try_from(params: BareDieParams) -> Result<Self, Self::Error> {
        BareDiePackage::new(params.name, params.width, params.height)
    }
}

impl From<BareDiePackage> for BareDieParams {
    fn from(pkg: BareDiePackage) -> Self {
        BareDieParams {
            name: pkg.name,
            width: pkg.width,
            height: pkg.height,
        }
    }
}
