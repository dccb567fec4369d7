//! # Invariant Checks
//!
//! Runtime checks for properties the orchestrator must never break (every output path stays
//! under the output base, the scene list is never empty). Checks that pass are recorded so
//! tests can assert afterwards that a code path actually enforced them.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use lazy_static::lazy_static;
use log::error;

use crate::orchestrator::LOG_TAG;

lazy_static! {
    /// `"<component>: <description>"` for every invariant that held at least once.
    static ref ENFORCED: Mutex<HashSet<String>> = Mutex::new(HashSet::new());
}

// A panicking test must not poison the log for the tests that follow it.
fn enforced() -> MutexGuard<'static, HashSet<String>> {
    ENFORCED.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn key(component: &str, description: &str) -> String {
    format!("{}: {}", component, description)
}

/// Checks an invariant and returns whether it held.
///
/// A violation is logged as an error, and panics in debug and test builds so it cannot go
/// unnoticed during development. Release builds keep going and leave the decision to the
/// caller.
pub fn check(condition: bool, component: &str, description: &str) -> bool {
    if condition {
        enforced().insert(key(component, description));
        return true;
    }

    error!("{} Invariant violated [{}]: {}", LOG_TAG, component, description);
    if cfg!(debug_assertions) {
        panic!("Invariant violated [{}]: {}", component, description);
    }
    false
}

/// Panics unless every listed invariant was checked (and held) since the process started.
#[allow(dead_code)]
pub fn assert_enforced(context: &str, required: &[(&str, &str)]) {
    let missing: Vec<String> = {
        let enforced = enforced();
        required
            .iter()
            .map(|(component, description)| key(component, description))
            .filter(|k| !enforced.contains(k))
            .collect()
    };

    if !missing.is_empty() {
        panic!("'{}' never enforced:\n{:#?}", context, missing);
    }
}
