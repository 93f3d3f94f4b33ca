//! Version command implementation.

use crate::style::print_labeled;

/// Version information for the CLI.
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("sidelobe {VERSION}");
    println!();
    println!("Over-the-air fuzzing for IEEE 802.15.4 stacks.");
    println!();
    println!("Build info:");
    print_labeled("Target", std::env::consts::ARCH);
    print_labeled("OS", std::env::consts::OS);
}
