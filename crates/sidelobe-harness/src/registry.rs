//! Harness lookup by name.

use std::sync::Arc;

use sidelobe_io::Transceiver;

use crate::{Harness, HarnessError, HarnessSettings, ReceivedFrameHarness};

const NAMES: &[&str] = &["received-frame"];

/// Registered harness names.
pub fn names() -> &'static [&'static str] {
    NAMES
}

/// Builds the harness registered under `name`, observing `link`.
///
/// The harness is returned closed.
pub fn create(
    name: &str,
    link: Arc<dyn Transceiver>,
    settings: &HarnessSettings,
) -> Result<Box<dyn Harness>, HarnessError> {
    match name {
        "received-frame" => Ok(Box::new(ReceivedFrameHarness::new(link, *settings))),
        _ => Err(HarnessError::Unknown {
            name: name.to_string(),
        }),
    }
}
