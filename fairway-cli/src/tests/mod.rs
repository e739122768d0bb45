//! Shared test harness modules for the Fairway CLI.

use super::*;

mod steps;
