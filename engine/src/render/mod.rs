//! Render bridge
//!
//! GPU-ready records for an external renderer. Drawing itself happens in the
//! host; this module only lays out the data it uploads.

pub mod instances;

pub use instances::{
    BodyInstance, DEFAULT_COLOR, SLEEPING_FLAG, collect_instances, pack_color, pack_color_f32, shape_kind,
};
