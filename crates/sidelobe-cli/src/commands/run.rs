//! The `run` command: assemble a run from names and configuration, drive it,
//! and write the result set.

use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use sidelobe::{
    Alternator, AlternatorConfig, AlternatorMode, ConstraintSet, GeneratorOptions,
    HarnessSettings, InterfaceOptions, SequenceNumber, Transceiver,
};
use sidelobe_config::SidelobeConfig;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{info, warn};

use crate::RunArgs;
use crate::style::{print_success, print_warn};

/// Layers command-line flags over the loaded configuration.
fn apply_overrides(config: &mut SidelobeConfig, args: &RunArgs) -> Result<()> {
    if let Some(channel) = args.channel {
        config.interface.channel = channel;
    }
    if let Some(iterations) = args.iterations {
        config.run.iterations = iterations;
    }
    if let Some(file) = &args.results_file {
        config.run.results_file = Some(file.clone());
    }
    if let Some(seq) = args.start_seq {
        config.generator.start_sequence = seq;
    }
    if let Some(pan) = args.target_pan {
        config.generator.target_pan = pan;
    }
    if let Some(addr) = args.target_addr {
        config.generator.target_addr = addr;
    }
    if let Some(settle) = args.settle_ms {
        config.run.settle_ms = settle;
    }
    if let Some(cap) = args.max_control_attempts {
        config.run.max_control_attempts = Some(cap);
    }
    config.validate().context("Invalid command-line override")?;
    Ok(())
}

fn parse_constraints(assignments: &[String]) -> Result<ConstraintSet> {
    let mut constraints = ConstraintSet::new();
    for assignment in assignments {
        let (name, value) = ConstraintSet::parse_assignment(assignment)?;
        constraints.insert(name, value);
    }
    Ok(constraints)
}

fn interface_options(config: &SidelobeConfig) -> Result<InterfaceOptions> {
    Ok(InterfaceOptions {
        channel: config.channel()?,
        tx_addr: config.interface.tx_addr,
        rx_bind: config.interface.rx_bind,
        generate_phy: config.interface.generate_phy,
        generate_mac: config.interface.generate_mac,
        tx_gain: config.interface.tx_gain,
    })
}

fn generator_options(config: &SidelobeConfig) -> GeneratorOptions {
    GeneratorOptions {
        start_sequence: SequenceNumber::new(config.generator.start_sequence),
        target_pan: config.generator.target_pan,
        target_addr: config.generator.target_addr,
        source_addr: config.generator.source_addr,
        seed: config.generator.seed,
        defaults: config.generator.constraints.clone(),
    }
}

fn harness_settings(config: &SidelobeConfig) -> HarnessSettings {
    HarnessSettings {
        tick: config.harness.tick(),
        queue_capacity: config.harness.queue_capacity,
        match_mode: config.harness.match_mode,
    }
}

fn alternator_config(config: &SidelobeConfig) -> AlternatorConfig {
    let mode = if config.run.record_raw {
        AlternatorMode::RxFrame
    } else {
        AlternatorMode::Plain
    };
    AlternatorConfig {
        mode,
        settle: config.run.settle(),
        max_control_attempts: config.run.max_control_attempts,
        warn_every: config.run.warn_every,
    }
}

fn close_quietly(link: &dyn Transceiver) {
    if let Err(e) = link.close() {
        warn!(interface = link.name(), error = %e, "failed to close interface");
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = super::config::load(args.project_dir.as_deref())?;
    apply_overrides(&mut config, args)?;
    let constraints = parse_constraints(&args.constraints)?;

    // Selection order fixes which exit status a run with several bad names
    // reports: interface, then generator, then harness.
    let options = interface_options(&config)?;
    let link = sidelobe::io::create(&args.interface, &options)
        .with_context(|| format!("Failed to create interface '{}'", args.interface))?;
    let rx_link: Arc<dyn Transceiver> = match &args.rx_interface {
        Some(name) => sidelobe::io::create(name, &options)
            .with_context(|| format!("Failed to create receive interface '{name}'"))?,
        None => Arc::clone(&link),
    };
    let generator = sidelobe::generators::create(&args.generator, &generator_options(&config))
        .with_context(|| format!("Failed to create generator '{}'", args.generator))?;
    let harness =
        sidelobe::harness::create(&args.harness, Arc::clone(&rx_link), &harness_settings(&config))
            .with_context(|| format!("Failed to create harness '{}'", args.harness))?;

    let stop = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&stop))
            .context("Failed to install signal handler")?;
    }

    info!(
        interface = %args.interface,
        generator = %args.generator,
        harness = %args.harness,
        iterations = config.run.iterations,
        "starting run"
    );

    let mut alternator =
        Alternator::new(generator, harness, Arc::clone(&link), alternator_config(&config))
            .with_constraints(constraints)
            .with_stop_flag(stop);
    let outcome = alternator.run(config.run.iterations);
    drop(alternator);

    close_quietly(link.as_ref());
    if args.rx_interface.is_some() {
        close_quietly(rx_link.as_ref());
    }

    let results = outcome.context("Run failed")?;
    let json = results.to_json_pretty()?;

    match &config.run.results_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!(
                "{} results written to {}",
                results.len(),
                path.display()
            ));
        }
        None => println!("{json}"),
    }

    if results.stats.interrupted {
        print_warn("Run interrupted; the result set is partial");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidelobe::ConstraintValue;

    #[test]
    fn constraints_parse_in_order() {
        let constraints = parse_constraints(&[
            "max_fill=4".to_string(),
            "fill_byte=0xf0".to_string(),
            "max_fill=2".to_string(),
        ])
        .unwrap();
        assert_eq!(constraints.get("max_fill"), Some(&ConstraintValue::Int(2)));
        assert_eq!(
            constraints.get("fill_byte"),
            Some(&ConstraintValue::Byte(0xF0))
        );
        assert!(parse_constraints(&["max_fill".to_string()]).is_err());
    }

    #[test]
    fn raw_recording_selects_the_mode() {
        let mut config = SidelobeConfig::default();
        assert_eq!(alternator_config(&config).mode, AlternatorMode::RxFrame);
        config.run.record_raw = false;
        assert_eq!(alternator_config(&config).mode, AlternatorMode::Plain);
    }

    #[test]
    fn generator_defaults_come_from_config() {
        let mut config = SidelobeConfig::default();
        config.generator.start_sequence = 7;
        config.generator.constraints = ConstraintSet::new().with("max_fill", 1i64);
        let options = generator_options(&config);
        assert_eq!(options.start_sequence, SequenceNumber::new(7));
        assert_eq!(options.defaults.len(), 1);
    }
}
