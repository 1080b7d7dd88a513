#[macro_use]
extern crate approx;

mod counting_narrow_phase;
mod environment_clone;
mod self_collision_permissions;
mod sorted_axes_index;
mod world_contacts;
