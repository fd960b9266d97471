//! Grid-array packages (BGA, PGA, LGA).
//!
//! Pins sit in a regular array of `width` columns by `height` rows, addressed
//! as row letters plus column number (`A1` is the first pin of the first row).
//! The layout decides which cells are populated; explicit `missing_pins` and
//! `additional_pins` are applied on top.

use crate::bringup::{BringupPins, JtagPins, PowerPins};
use crate::error::PackageError;
use crate::pin::{GridPin, Pin};
use crate::PackageDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Pins between consecutive power blocks in the spread-out power layout.
const POWER_SKIP: usize = 15;

/// Signal bringup occupies the first eight pins of row A.
const SIGNAL_BRINGUP_COLS: u32 = 8;

/// Which cells of the array are populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// Every cell.
    #[default]
    Full,
    /// A ring `channel_width` deep around the edge.
    Perimeter,
    /// `channel_width` full rows at the top and bottom.
    Channel,
    /// A perimeter ring plus a centred square island of core power.
    Island,
}

/// Construction parameters of a grid-array package, as stored in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridArrayParams {
    /// Package name.
    pub name: String,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Populated-cell layout.
    #[serde(default)]
    pub layout_type: LayoutType,
    /// Ring depth for perimeter, channel and island layouts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_width: Option<u32>,
    /// Side length of the centre island.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub island_width: Option<u32>,
    /// Cells removed from the layout.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub missing_pins: BTreeSet<GridPin>,
    /// Cells added to the layout.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub additional_pins: BTreeSet<GridPin>,
}

impl GridArrayParams {
    /// Parameters for a fully populated `width` x `height` array.
    pub fn full(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            layout_type: LayoutType::Full,
            channel_width: None,
            island_width: None,
            missing_pins: BTreeSet::new(),
            additional_pins: BTreeSet::new(),
        }
    }
}

/// A grid-array package.
///
/// Row A carries reset (`A1`), clock (`A2`), JTAG (`A3`..`A7`) and the
/// heartbeat (`A8`). The island of an island layout is paired up entirely as
/// core power; the remaining pins carry a core pair and a `d` pair every
/// nineteen pins. Allocation walks the array quadrant by quadrant so that an
/// interface tends to land in one corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridArrayParams", into = "GridArrayParams")]
pub struct GridArrayPackage {
    params: GridArrayParams,
    outer: BTreeSet<GridPin>,
    island: BTreeSet<GridPin>,
    ordered: Vec<Pin>,
}

impl GridArrayPackage {
    /// Creates a grid-array package from its parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidDimensions`] if a layout parameter is
    /// missing, the island does not fit inside the perimeter ring, or row A
    /// cannot hold the signal bringup pins.
    pub fn new(params: GridArrayParams) -> Result<Self, PackageError> {
        let invalid = |reason: String| PackageError::InvalidDimensions {
            package: params.name.clone(),
            reason,
        };

        let (mut outer, mut island) = layout_cells(&params).map_err(invalid)?;
        for pin in &params.missing_pins {
            outer.remove(pin);
            island.remove(pin);
        }
        outer.extend(params.additional_pins.iter().copied());
        outer.retain(|pin| !island.contains(pin));
        // Island pins pair up as core power; an unpaired one carries signals.
        if island.len() % 2 == 1 {
            if let Some(spare) = island.pop_last() {
                log::warn!(
                    "{}: island pin {spare} has no ground partner, adding it to the signal pool",
                    params.name
                );
                outer.insert(spare);
            }
        }

        let signal: Vec<GridPin> = (1..=SIGNAL_BRINGUP_COLS).map(|col| GridPin::new(1, col)).collect();
        if let Some(absent) = signal.iter().find(|pin| !outer.contains(pin)) {
            return Err(invalid(format!(
                "bringup pin {absent} is not populated"
            )));
        }

        let mut pkg = Self {
            params,
            outer,
            island,
            ordered: Vec::new(),
        };

        let reserved = pkg.bringup_pins().to_set();
        let midrow = pkg.params.height / 2;
        let midcol = pkg.params.width / 2;
        let mut free: Vec<GridPin> = pkg
            .outer
            .iter()
            .copied()
            .filter(|pin| !reserved.contains(&Pin::Grid(*pin)))
            .collect();
        free.sort_by_key(|pin| (quadrant(pin, midrow, midcol), *pin));
        pkg.ordered = free.into_iter().map(Pin::Grid).collect();

        Ok(pkg)
    }

    /// The construction parameters.
    pub fn params(&self) -> &GridArrayParams {
        &self.params
    }

    fn power(&self) -> Vec<PowerPins> {
        let mut pins = Vec::new();

        let island: Vec<GridPin> = self.island.iter().copied().collect();
        for pair in island.chunks_exact(2) {
            pins.push(PowerPins::new(Pin::Grid(pair[0]), Pin::Grid(pair[1])));
        }

        let spread: Vec<GridPin> = self
            .outer
            .iter()
            .copied()
            .filter(|pin| !(pin.row == 1 && pin.col <= SIGNAL_BRINGUP_COLS))
            .collect();
        for block in spread.chunks(4 + POWER_SKIP) {
            if let [vdd, vss, ..] = block {
                pins.push(PowerPins::new(Pin::Grid(*vdd), Pin::Grid(*vss)));
            }
            if let [_, _, dvdd, dvss, ..] = block {
                pins.push(PowerPins::named(Pin::Grid(*dvdd), Pin::Grid(*dvss), "d"));
            }
        }
        pins
    }
}

fn rect(rows: RangeInclusive<u32>, cols: RangeInclusive<u32>) -> BTreeSet<GridPin> {
    rows.flat_map(|row| cols.clone().map(move |col| GridPin::new(row, col)))
        .collect()
}

/// Returns the (outer, island) cells for the layout before overrides.
fn layout_cells(params: &GridArrayParams) -> Result<(BTreeSet<GridPin>, BTreeSet<GridPin>), String> {
    let (w, h) = (params.width, params.height);
    if w == 0 || h == 0 {
        return Err(format!("grid must be non-empty, got {w}x{h}"));
    }
    let all = rect(1..=h, 1..=w);
    let channel = || match params.channel_width {
        Some(c) if c > 0 => Ok(c),
        _ => Err(format!(
            "{:?} layout requires a positive channel_width",
            params.layout_type
        )),
    };
    let hole = |c: u32| {
        if 2 * c >= h || 2 * c >= w {
            BTreeSet::new()
        } else {
            rect(c + 1..=h - c, c + 1..=w - c)
        }
    };

    match params.layout_type {
        LayoutType::Full => Ok((all, BTreeSet::new())),
        LayoutType::Perimeter => {
            let c = channel()?;
            Ok((&all - &hole(c), BTreeSet::new()))
        }
        LayoutType::Channel => {
            let c = channel()?;
            let rows: BTreeSet<GridPin> = all
                .into_iter()
                .filter(|pin| pin.row <= c || pin.row > h.saturating_sub(c))
                .collect();
            Ok((rows, BTreeSet::new()))
        }
        LayoutType::Island => {
            let c = channel()?;
            let iw = match params.island_width {
                Some(iw) if iw > 0 => iw,
                _ => return Err("island layout requires a positive island_width".to_string()),
            };
            if iw > h || iw > w {
                return Err(format!("island of width {iw} does not fit a {w}x{h} grid"));
            }
            let row0 = (h - iw) / 2 + 1;
            let col0 = (w - iw) / 2 + 1;
            let (row1, col1) = (row0 + iw - 1, col0 + iw - 1);
            if row0 <= c || col0 <= c || row1 > h - c || col1 > w - c {
                return Err(format!(
                    "island of width {iw} does not fit inside a channel of width {c}"
                ));
            }
            Ok((&all - &hole(c), rect(row0..=row1, col0..=col1)))
        }
    }
}

/// Quadrant index: rows before the midline first, then columns.
fn quadrant(pin: &GridPin, midrow: u32, midcol: u32) -> u8 {
    let lower = u8::from(pin.row >= midrow);
    let right = u8::from(pin.col >= midcol);
    lower + 2 * right
}

impl PackageDefinition for GridArrayPackage {
    fn name(&self) -> &str {
        &self.params.name
    }

    fn pins(&self) -> BTreeSet<Pin> {
        self.outer
            .iter()
            .chain(self.island.iter())
            .copied()
            .map(Pin::Grid)
            .collect()
    }

    fn bringup_pins(&self) -> BringupPins {
        let a = |col: u32| Pin::Grid(GridPin::new(1, col));
        BringupPins {
            core_power: self.power(),
            core_clock: a(2),
            core_reset: a(1),
            core_heartbeat: a(8),
            core_jtag: Some(JtagPins::from_consecutive([a(3), a(4), a(5), a(6), a(7)])),
        }
    }

    fn ordered_pins(&self) -> &[Pin] {
        &self.ordered
    }

    fn parse_location(&self, location: &str) -> Option<Pin> {
        location.parse::<GridPin>().ok().map(Pin::Grid)
    }
}

impl TryFrom<GridArrayParams> for GridArrayPackage {
    type Error = PackageError;

    fn try_from(params: GridArrayParams) -> Result<Self, Self::Error> {
        GridArrayPackage::new(params)
    }
}

impl From<GridArrayPackage> for GridArrayParams {
    fn from(pkg: GridArrayPackage) -> Self {
        pkg.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(s: &str) -> GridPin {
        s.parse().unwrap()
    }

    #[test]
    fn full_grid_bringup() {
        let pkg = GridArrayPackage::new(GridArrayParams::full("bga144", 12, 12)).unwrap();
        assert_eq!(pkg.pins().len(), 144);
        let bringup = pkg.bringup_pins();
        assert_eq!(bringup.core_reset, Pin::Grid(g("A1")));
        assert_eq!(bringup.core_clock, Pin::Grid(g("A2")));
        assert_eq!(bringup.core_heartbeat, Pin::Grid(g("A8")));
        assert_eq!(bringup.core_jtag.as_ref().unwrap().tdo, Pin::Grid(g("A7")));
        assert_eq!(bringup.core_power[0].power, Pin::Grid(g("A9")));
        assert_eq!(bringup.core_power[1].ground, Pin::Grid(g("A12")));
        assert_eq!(bringup.core_power[1].name.as_deref(), Some("d"));
        // The block after A9..A12 skips B1..C3.
        assert_eq!(bringup.core_power[2].power, Pin::Grid(g("C4")));
    }

    #[test]
    fn full_grid_counts() {
        let pkg = GridArrayPackage::new(GridArrayParams::full("bga144", 12, 12)).unwrap();
        let bringup = pkg.bringup_pins();
        // 136 spread pins: seven full blocks plus a trailing core pair.
        assert_eq!(bringup.core_power.len(), 15);
        assert_eq!(bringup.to_set().len(), bringup.slot_count());
        assert_eq!(pkg.ordered_pins().len(), 144 - 8 - 30);
    }

    #[test]
    fn ordering_is_by_quadrant() {
        let pkg = GridArrayPackage::new(GridArrayParams::full("bga144", 12, 12)).unwrap();
        let ordered = pkg.ordered_pins();
        let quads: Vec<u8> = ordered
            .iter()
            .map(|p| match p {
                Pin::Grid(gp) => quadrant(gp, 6, 6),
                _ => unreachable!(),
            })
            .collect();
        let mut sorted = quads.clone();
        sorted.sort();
        assert_eq!(quads, sorted);
        assert_eq!(quads.last(), Some(&3));
    }

    #[test]
    fn perimeter_layout() {
        let params = GridArrayParams {
            layout_type: LayoutType::Perimeter,
            channel_width: Some(2),
            ..GridArrayParams::full("pbga", 10, 10)
        };
        let pkg = GridArrayPackage::new(params).unwrap();
        assert_eq!(pkg.pins().len(), 100 - 36);
        assert!(!pkg.pins().contains(&Pin::Grid(g("E5"))));
    }

    #[test]
    fn channel_layout() {
        let params = GridArrayParams {
            layout_type: LayoutType::Channel,
            channel_width: Some(2),
            ..GridArrayParams::full("cbga", 10, 10)
        };
        let pkg = GridArrayPackage::new(params).unwrap();
        assert_eq!(pkg.pins().len(), 40);
        assert!(pkg.pins().contains(&Pin::Grid(g("K10"))));
        assert!(!pkg.pins().contains(&Pin::Grid(g("C1"))));
    }

    #[test]
    fn island_is_core_power() {
        let params = GridArrayParams {
            layout_type: LayoutType::Island,
            channel_width: Some(3),
            island_width: Some(2),
            ..GridArrayParams::full("ibga", 12, 12)
        };
        let pkg = GridArrayPackage::new(params).unwrap();
        let bringup = pkg.bringup_pins();
        let island: BTreeSet<Pin> = [g("F6"), g("F7"), g("G6"), g("G7")]
            .into_iter()
            .map(Pin::Grid)
            .collect();
        assert!(island.is_subset(&bringup.to_set()));
        assert!(bringup.core_power[..2].iter().all(|pp| pp.name.is_none()));
        assert!(pkg.ordered_pins().iter().all(|p| !island.contains(p)));
    }

    #[test]
    fn odd_island_pin_joins_the_pool() {
        let params = GridArrayParams {
            layout_type: LayoutType::Island,
            channel_width: Some(3),
            island_width: Some(3),
            ..GridArrayParams::full("ibga", 12, 12)
        };
        let pkg = GridArrayPackage::new(params).unwrap();
        let bringup = pkg.bringup_pins().to_set();
        let ordered: BTreeSet<Pin> = pkg.ordered_pins().iter().cloned().collect();
        let bonded: BTreeSet<Pin> = bringup.union(&ordered).cloned().collect();
        assert_eq!(bonded, pkg.pins());
        assert_eq!(pkg.island.len(), 8);
        assert!(!pkg.outer.is_disjoint(&layout_cells(&pkg.params).unwrap().1));
    }

    #[test]
    fn island_must_fit_hole() {
        let params = GridArrayParams {
            layout_type: LayoutType::Island,
            channel_width: Some(5),
            island_width: Some(4),
            ..GridArrayParams::full("ibga", 12, 12)
        };
        assert!(matches!(
            GridArrayPackage::new(params),
            Err(PackageError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn layout_requires_channel_width() {
        let params = GridArrayParams {
            layout_type: LayoutType::Perimeter,
            ..GridArrayParams::full("pbga", 10, 10)
        };
        assert!(GridArrayPackage::new(params).is_err());
    }

    #[test]
    fn missing_and_additional_pins() {
        let params = GridArrayParams {
            missing_pins: [g("L11"), g("L12")].into_iter().collect(),
            additional_pins: [g("M1")].into_iter().collect(),
            ..GridArrayParams::full("bga", 12, 11)
        };
        let pkg = GridArrayPackage::new(params).unwrap();
        let pins = pkg.pins();
        assert_eq!(pins.len(), 132 - 2 + 1);
        assert!(!pins.contains(&Pin::Grid(g("L11"))));
        assert!(pins.contains(&Pin::Grid(g("M1"))));
    }

    #[test]
    fn missing_bringup_pin_is_rejected() {
        let params = GridArrayParams {
            missing_pins: [g("A2")].into_iter().collect(),
            ..GridArrayParams::full("bga", 12, 12)
        };
        assert!(GridArrayPackage::new(params).is_err());
        assert!(GridArrayPackage::new(GridArrayParams::full("narrow", 6, 12)).is_err());
    }

    #[test]
    fn serde_roundtrip_with_overrides() {
        let params = GridArrayParams {
            missing_pins: [g("L11")].into_iter().collect(),
            ..GridArrayParams::full("bga", 12, 12)
        };
        let pkg = GridArrayPackage::new(params).unwrap();
        let json = serde_json::to_string(&pkg).unwrap();
        assert_eq!(
            json,
            r#"{"name":"bga","width":12,"height":12,"layout_type":"full","missing_pins":["L11"]}"#
        );
        let back: GridArrayPackage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pkg);
    }
}
