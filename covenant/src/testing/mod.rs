//! Testing utilities for contracted classes.
//!
//! This module provides:
//! - Assertions on call results and violation stages
//! - A shared call log for observing side effects and check order

mod assertions;
mod fixtures;

pub use assertions::{
    assert_invariant_violation, assert_no_violation, assert_post_violation,
    assert_pre_violation, assert_violation,
};
pub use fixtures::{recording_check, CallLog};
