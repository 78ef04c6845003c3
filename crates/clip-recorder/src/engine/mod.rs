//! cpal/hound backed audio engine for the desktop host.

mod cpal_engine;
pub(crate) mod player;
mod recorder;
pub(crate) mod wav;

pub(crate) use cpal_engine::CpalEngine;
