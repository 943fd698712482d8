//! Tractor-beam grapple: aim, fire, bind a target with a rope chain, reel it in.
//!
//! [`GrappleController`] is the entry point. It owns the rope chain and drives
//! the [`CaptureResolver`] and [`ReelMechanism`]; everything outside the beam
//! (creature AI, sound, HUD, craft movement) is reached through the traits in
//! [`hooks`], bundled per call in a [`GrappleContext`].

pub mod capture;
pub mod config;
pub mod controller;
pub mod hooks;
pub mod reel;
pub mod rope_chain;
pub mod target;

#[cfg(test)]
mod testing;

pub use capture::*;
pub use config::*;
pub use controller::*;
pub use hooks::*;
pub use reel::*;
pub use rope_chain::*;
pub use target::*;
