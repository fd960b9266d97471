//! The Openframe carrier: a fixed pin table rather than a computed geometry.

use crate::bringup::{BringupPins, PowerPins};
use crate::pin::{CarrierKind, CarrierPin, Pin};
use crate::PackageDefinition;
use bondout_common::Voltage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const fn gpio(pin: u32, index: u32) -> CarrierPin {
    CarrierPin::new(pin, CarrierKind::Gpio, index)
}

/// GPIOs available for allocation, in allocation order.
///
/// gpio[38], gpio[39] and gpio[40] are taken by clock, heartbeat and reset.
const GPIO: [CarrierPin; 41] = [
    gpio(31, 0),
    gpio(32, 1),
    gpio(33, 2),
    gpio(34, 3),
    gpio(35, 4),
    gpio(36, 5),
    gpio(37, 6),
    gpio(41, 7),
    gpio(42, 8),
    gpio(43, 9),
    gpio(44, 10),
    gpio(45, 11),
    gpio(46, 12),
    gpio(48, 13),
    gpio(50, 14),
    gpio(51, 15),
    gpio(53, 16),
    gpio(54, 17),
    gpio(55, 18),
    gpio(57, 19),
    gpio(58, 20),
    gpio(59, 21),
    gpio(60, 22),
    gpio(61, 23),
    gpio(62, 24),
    gpio(2, 25),
    gpio(3, 26),
    gpio(4, 27),
    gpio(5, 28),
    gpio(6, 29),
    gpio(7, 30),
    gpio(8, 31),
    gpio(11, 32),
    gpio(12, 33),
    gpio(13, 34),
    gpio(14, 35),
    gpio(15, 36),
    gpio(16, 37),
    gpio(26, 41),
    gpio(27, 42),
    gpio(28, 43),
];

const CLOCK: CarrierPin = gpio(22, 38);
const HEARTBEAT: CarrierPin = gpio(24, 39);
const RESET: CarrierPin = gpio(25, 40);

const CORE_VCC: CarrierPin = CarrierPin::new(18, CarrierKind::Vcc, 0);
const CORE_VSS: CarrierPin = CarrierPin::new(23, CarrierKind::Vss, 0);
const CORE_VOLTS: f64 = 1.8;

/// Construction parameters of the Openframe carrier, as stored in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenframeParams {
    /// Package name.
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    "openframe".to_string()
}

/// The Efabless Openframe carrier used for open-source shuttle runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "OpenframeParams", into = "OpenframeParams")]
pub struct OpenframePackage {
    name: String,
    ordered: Vec<Pin>,
}

impl OpenframePackage {
    /// Creates the carrier under the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ordered: GPIO.into_iter().map(Pin::Carrier).collect(),
        }
    }
}

impl Default for OpenframePackage {
    fn default() -> Self {
        Self::new(default_name())
    }
}

impl PackageDefinition for OpenframePackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn pins(&self) -> BTreeSet<Pin> {
        let mut pins: BTreeSet<Pin> = self.ordered.iter().cloned().collect();
        pins.extend(self.bringup_pins().to_set());
        pins
    }

    fn bringup_pins(&self) -> BringupPins {
        BringupPins {
            core_power: vec![PowerPins {
                voltage: Some(Voltage::new(CORE_VOLTS)),
                ..PowerPins::new(Pin::Carrier(CORE_VCC), Pin::Carrier(CORE_VSS))
            }],
            core_clock: Pin::Carrier(CLOCK),
            core_reset: Pin::Carrier(RESET),
            core_heartbeat: Pin::Carrier(HEARTBEAT),
            core_jtag: None,
        }
    }

    fn ordered_pins(&self) -> &[Pin] {
        &self.ordered
    }

    /// Accepts a physical pin number (`"31"`) or a GPIO name (`"gpio[0]"`, `"gpio0"`).
    fn parse_location(&self, location: &str) -> Option<Pin> {
        let location = location.trim();
        let by_number = location.parse::<u32>().ok();
        let by_gpio = location
            .strip_prefix("gpio")
            .map(|rest| rest.trim_start_matches('[').trim_end_matches(']'))
            .and_then(|idx| idx.parse::<u32>().ok());

        self.pins().into_iter().find(|pin| match pin {
            Pin::Carrier(c) => {
                Some(c.pin) == by_number || (c.kind == CarrierKind::Gpio && Some(c.index) == by_gpio)
            }
            _ => false,
        })
    }
}

impl From<OpenframeParams> for OpenframePackage {
    fn from(params: OpenframeParams) -> Self {
        OpenframePackage::new(params.name)
    }
}

impl From<OpenframePackage> for OpenframeParams {
    fn from(pkg: OpenframePackage) -> Self {
        OpenframeParams { name: pkg.name }
    }
}
