//! `bondout show`: print the pin table of a lock file.

use std::error::Error;

use bondout_lock::{load_lock_file, LockFile};
use bondout_package::PackageDefinition;

use crate::project::lock_file_path;
use crate::{GlobalArgs, ReportFormat, ShowArgs};

const HEADER: [&str; 5] = ["PORT", "TYPE", "DIR", "PINS", "POWER"];

/// Runs the `bondout show` command.
pub fn run(args: &ShowArgs, global: &GlobalArgs) -> Result<i32, Box<dyn Error>> {
    let path = lock_file_path(args.lockfile.as_deref(), global)?;
    let lock = load_lock_file(&path)?;
    match args.format {
        ReportFormat::Text => print!("{}", render_table(&lock)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&lock.port_map)?),
    }
    Ok(0)
}

/// Renders one row per port, columns padded to the widest cell.
fn render_table(lock: &LockFile) -> String {
    let rows: Vec<[String; 5]> = lock
        .port_map
        .iter()
        .map(|(component, interface, name, port)| {
            let pins = match &port.pins {
                Some(pins) => pins.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
                None => "unallocated".to_string(),
            };
            let power = port
                .power_allocation
                .iter()
                .map(|(domain, pad)| format!("{domain}={pad}"))
                .collect::<Vec<_>>()
                .join(" ");
            [
                format!("{component}.{interface}.{name}"),
                port.kind.to_string(),
                port.iomodel.direction.to_string(),
                pins,
                power,
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = format!(
        "{} on {} ({})\n",
        lock.package.name(),
        lock.process,
        lock.package.package_type()
    );
    let header = HEADER.map(str::to_string);
    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondout_common::Process;
    use bondout_lock::{lock, LockOptions};
    use bondout_package::load_package;
    use indexmap::IndexMap;

    #[test]
    fn table_lists_bringup_ports() {
        let pkg = load_package("cf20").unwrap();
        let locked = lock(&pkg, Process::Gf180, &IndexMap::new(), None, &LockOptions::default()).unwrap();
        let table = render_table(&locked);
        let mut lines = table.lines();
        assert_eq!(lines.next(), Some("cf20 on gf180 (BareDiePackageDef)"));
        assert!(lines.next().unwrap().starts_with("PORT"));
        assert!(table.contains("_core.bringup_pins.clk"));
        assert!(table.lines().any(|l| l.starts_with("_core.bringup_pins.rst_n") && l.contains("reset")));
    }

    #[test]
    fn columns_are_aligned() {
        let pkg = load_package("pga144").unwrap();
        let locked = lock(&pkg, Process::Sky130, &IndexMap::new(), None, &LockOptions::default()).unwrap();
        let table = render_table(&locked);
        let header = table.lines().nth(1).unwrap();
        let first = table.lines().nth(2).unwrap();
        assert_eq!(header.find("TYPE"), first.find("clock"));
    }
}
