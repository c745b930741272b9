//! Envelope generators modeled on analog RC circuits.
//!
//! This module provides envelope generators whose stages follow the
//! exponential charge/discharge curves of a resistor-capacitor network,
//! the behavior found in classic analog synthesizer envelope circuits.

mod rc_adsr;

pub use rc_adsr::{RcAdsr, Stage};
