//! Scene control for Loopwork
//!
//! This crate drives a [`stitch::StitchPipeline`] from IPC messages sent by
//! the rendering surface and answers with geometry, hover and selection
//! updates.

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;
use loopwork_ipc::CoreToSurface;

mod controller;
mod convert;

pub use controller::{codes, SceneController};
pub use convert::{cell_spec, chart_from_document, stitch_ref};

/// Queue of messages to send to the surface
/// The surface layer should drain this once per frame
#[derive(Default)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct OutboundMessages {
    pub messages: Vec<CoreToSurface>,
}

impl OutboundMessages {
    /// Queue a message to be sent to the surface
    pub fn send(&mut self, msg: CoreToSurface) {
        self.messages.push(msg);
    }

    /// Take all queued messages, leaving the queue empty
    pub fn drain(&mut self) -> Vec<CoreToSurface> {
        std::mem::take(&mut self.messages)
    }
}
