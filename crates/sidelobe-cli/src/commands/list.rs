//! Lists what a run can be assembled from.

use anyhow::{Context, Result};
use comfy_table::Cell;
use sidelobe::{GeneratorOptions, InterfaceOptions};

use crate::style::styled_table;

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn run() -> Result<()> {
    let mut interfaces = styled_table(&["Interface", "Driver", "Receives"]);
    let options = InterfaceOptions::default();
    for name in sidelobe::io::names() {
        let link = sidelobe::io::create(name, &options)
            .with_context(|| format!("Failed to create interface '{name}'"))?;
        interfaces.add_row(vec![
            Cell::new(name),
            Cell::new(link.status().driver),
            Cell::new(yes_no(link.supports_receive())),
        ]);
    }
    println!("{interfaces}");

    let mut generators = styled_table(&["Generator", "PHY", "MAC"]);
    let options = GeneratorOptions::default();
    for name in sidelobe::generators::names() {
        let generator = sidelobe::generators::create(name, &options)
            .with_context(|| format!("Failed to create generator '{name}'"))?;
        generators.add_row(vec![
            *name,
            yes_no(generator.includes_phy()),
            yes_no(generator.includes_mac()),
        ]);
    }
    println!("{generators}");

    let mut harnesses = styled_table(&["Harness"]);
    for name in sidelobe::harness::names() {
        harnesses.add_row(vec![*name]);
    }
    println!("{harnesses}");

    Ok(())
}
