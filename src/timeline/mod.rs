//! Snapshot + delta timeline storage and state reconstruction

pub mod reconstruction;
pub mod snapshot;

pub use reconstruction::{reconstruct, Replayer};
pub use snapshot::{
    build_owner_layer, latest_snapshot, owner_layer_at, Delta, OwnerRanges, PolityUpdate, Snapshot,
    TimelineIndex,
};
