//! Seqcheck stateful command-sequence testing.
//!
//! This is the main entry point for the seqcheck library: describe each
//! operation of a stateful system as a [`Command`] with a precondition and a
//! model-checked effect, bind it to parameter arbitraries with [`command`],
//! collect the kinds with [`commands`], and hand the whole thing to
//! [`forall`] to generate, execute and shrink command sequences.

pub use seqcheck_core::*;
