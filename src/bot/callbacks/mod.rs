//! Callbacks module for inline keyboard callback queries
//!
//! - `callback_handler`: routes review card button presses into the publicise flow

pub mod callback_handler;
