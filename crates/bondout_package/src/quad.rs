//! Quad packages: pins around four edges, numbered anti-clockwise.
//!
//! Covers the QFN, QFP and PGA-style perimeter packages. Pin 1 is the top of
//! the left edge; numbering runs down the left side, along the bottom, up the
//! right side and back along the top, ending at pin `2 * (width + height)`.

use crate::bringup::{BringupPins, JtagPins, PowerPins};
use crate::error::PackageError;
use crate::pin::Pin;
use crate::PackageDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Smallest edge length that leaves room for a mid-side power block.
const MIN_SIDE: u32 = 8;

/// Construction parameters of a quad package, as stored in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadParams {
    /// Package name.
    pub name: String,
    /// Pins along the top and bottom edges.
    pub width: u32,
    /// Pins along the left and right edges.
    pub height: u32,
}

/// A quad package with `width` pins on the top and bottom edges and `height`
/// pins on the left and right edges.
///
/// Bringup layout:
/// - reset on pin 1, clock on pin 2, heartbeat on the last pin;
/// - a core pair and a `d` pair in the middle of the left edge, with more
///   edges powered as the package grows (`(width + height) / 12` decides how
///   many: bottom above 2, right above 1, top above 3);
/// - JTAG on the five pins just before the heartbeat, if they are free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuadParams", into = "QuadParams")]
pub struct QuadPackage {
    name: String,
    width: u32,
    height: u32,
    ordered: Vec<Pin>,
}

impl QuadPackage {
    /// Creates a quad package, computing its allocation ordering.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidDimensions`] if either edge is shorter
    /// than eight pins.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Result<Self, PackageError> {
        let name = name.into();
        if width < MIN_SIDE || height < MIN_SIDE {
            return Err(PackageError::InvalidDimensions {
                package: name,
                reason: format!(
                    "quad edges must be at least {MIN_SIDE} pins, got {width}x{height}"
                ),
            });
        }

        let bringup = quad_bringup(width, height);
        let reserved = bringup.to_set();
        if reserved.len() != bringup.slot_count() {
            return Err(PackageError::InvalidDimensions {
                package: name,
                reason: "bringup pins overlap".to_string(),
            });
        }

        let total = 2 * (width + height);
        let ordered = (1..=total)
            .map(Pin::Numbered)
            .filter(|p| !reserved.contains(p))
            .collect();

        Ok(Self {
            name,
            width,
            height,
            ordered,
        })
    }

    /// Pins along the top and bottom edges.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pins along the left and right edges.
    pub fn height(&self) -> u32 {
        self.height
    }

    fn total(&self) -> u32 {
        2 * (self.width + self.height)
    }
}

fn quad_power(width: u32, height: u32) -> Vec<PowerPins> {
    let n = (width + height) / 12;
    // (first pin offset, edge length, enabled), anti-clockwise from the left edge.
    let sides = [
        (0, height, true),
        (height, width, n > 2),
        (height + width, height, n > 1),
        (2 * height + width, width, n > 3),
    ];

    let mut pins = Vec::new();
    for (start, len, enabled) in sides {
        if !enabled {
            continue;
        }
        let p = start + len / 2 - 1;
        pins.push(PowerPins::new(Pin::Numbered(p), Pin::Numbered(p + 1)));
        pins.push(PowerPins::named(
            Pin::Numbered(p + 2),
            Pin::Numbered(p + 3),
            "d",
        ));
    }
    pins
}

fn quad_bringup(width: u32, height: u32) -> BringupPins {
    let total = 2 * (width + height);
    let core_power = quad_power(width, height);

    let power_set: BTreeSet<Pin> = core_power.iter().flat_map(PowerPins::to_set).collect();
    let jtag_pins = [5, 4, 3, 2, 1].map(|back| Pin::Numbered(total - back));
    let core_jtag = jtag_pins
        .iter()
        .all(|p| !power_set.contains(p))
        .then(|| JtagPins::from_consecutive(jtag_pins));

    BringupPins {
        core_power,
        core_clock: Pin::Numbered(2),
        core_reset: Pin::Numbered(1),
        core_heartbeat: Pin::Numbered(total),
        core_jtag,
    }
}

impl PackageDefinition for QuadPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn pins(&self) -> BTreeSet<Pin> {
        (1..=self.total()).map(Pin::Numbered).collect()
    }

    fn bringup_pins(&self) -> BringupPins {
        quad_bringup(self.width, self.height)
    }

    fn ordered_pins(&self) -> &[Pin] {
        &self.ordered
    }

    fn parse_location(&self, location: &str) -> Option<Pin> {
        location.trim().parse().ok().map(Pin::Numbered)
    }
}

impl TryFrom<QuadParams> for QuadPackage {
    type Error = PackageError;

    fn try_from(params: QuadParams) -> Result<Self, Self::Error> {
        QuadPackage::new(params.name, params.width, params.height)
    }
}

impl From<QuadPackage> for QuadParams {
    fn from(pkg: QuadPackage) -> Self {
        QuadParams {
            name: pkg.name,
            width: pkg.width,
            height: pkg.height,
        }
    }
}
