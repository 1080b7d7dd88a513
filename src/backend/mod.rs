//! The stateful parts of the collision backend: its process-wide lifecycle
//! and the narrow-phase contact generation.

pub use self::lifecycle::{ensure_thread_ready, is_thread_ready, live_references, BackendRef};
pub use self::narrow_phase::{
    BackendContact, ContactBuffer, NarrowPhase, ParryNarrowPhase, MAX_BACKEND_CONTACTS,
};

mod lifecycle;
mod narrow_phase;
