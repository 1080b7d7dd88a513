//! The collision environment: a robot, its world, and the queries between them.

pub use self::contact::{AllowedContact, Contact, ContactReport};
pub use self::error::EnvironmentError;

use self::query::CollisionQuery;
use crate::backend::{ensure_thread_ready, BackendRef, NarrowPhase, ParryNarrowPhase};
use crate::kinematics::{AttachedBodyModel, KinematicState, RobotModel};
use crate::math::{Isometry, Real};
use crate::permissions::{AllowedCollisionMatrix, SelfCollisionMatrix};
use crate::robot::{RobotCollisionParams, RobotGeometry};
use crate::shapes::{Shape, StaticShape};
use crate::world::{EnvironmentObjects, WorldGeometry};
use std::collections::HashMap;
use std::sync::Arc;

mod contact;
mod error;
#[cfg(feature = "parallel")]
mod parallel;
mod query;

/// A robot and the obstacles surrounding it, ready to be checked for collisions.
///
/// Configuration methods take `&mut self` while queries take `&self`, so an
/// environment cannot be modified while it is being queried. Cloning an
/// environment yields a fully independent copy that can be handed to another
/// thread.
pub struct CollisionEnvironment {
    _backend: BackendRef,
    pub(crate) robot: RobotGeometry,
    pub(crate) world: WorldGeometry,
    pub(crate) narrow_phase: Arc<dyn NarrowPhase>,
    self_collision: bool,
    pub(crate) verbose: bool,
}

impl Default for CollisionEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionEnvironment {
    /// An empty environment using parry's contact generation.
    pub fn new() -> Self {
        Self::with_narrow_phase(Arc::new(ParryNarrowPhase))
    }

    /// An empty environment computing contacts with `narrow_phase`.
    pub fn with_narrow_phase(narrow_phase: Arc<dyn NarrowPhase>) -> Self {
        Self {
            _backend: BackendRef::acquire(),
            robot: RobotGeometry::default(),
            world: WorldGeometry::new(),
            narrow_phase,
            self_collision: true,
            verbose: false,
        }
    }

    /*
     * Robot.
     */
    /// Builds the collision geometry of `model`, replacing the current robot.
    ///
    /// On failure, the current robot is left untouched.
    pub fn bind_robot_model(
        &mut self,
        model: RobotModel,
        params: RobotCollisionParams,
    ) -> Result<(), EnvironmentError> {
        self.robot = RobotGeometry::bind(model, params)?;
        Ok(())
    }

    /// The collision geometry of the robot.
    pub fn robot(&self) -> &RobotGeometry {
        &self.robot
    }

    /// The robot model, attached bodies included.
    pub fn robot_model(&self) -> &RobotModel {
        self.robot.model()
    }

    /// Places every robot primitive according to `state`.
    pub fn update_robot_model<S: KinematicState + ?Sized>(&mut self, state: &S) {
        self.robot.update(state);
    }

    /// Overrides the padding of some robot links or attached bodies.
    pub fn set_robot_link_padding(
        &mut self,
        padding: &HashMap<String, Real>,
    ) -> Result<(), EnvironmentError> {
        self.robot.set_padding(padding)
    }

    /// Restores the padding the robot was bound with.
    pub fn revert_robot_link_padding(&mut self) -> Result<(), EnvironmentError> {
        self.robot.revert_padding()
    }

    /// The padding applied to the link or attached body `name`.
    pub fn link_padding(&self, name: &str) -> Option<Real> {
        self.robot.padding_of(name)
    }

    /// Attaches `body` to the robot link `link`.
    pub fn attach_body(
        &mut self,
        link: &str,
        body: AttachedBodyModel,
    ) -> Result<(), EnvironmentError> {
        self.robot.attach_body(link, body)
    }

    /// Detaches every body from the robot link `link`.
    pub fn clear_attached_bodies(&mut self, link: &str) -> Result<(), EnvironmentError> {
        self.robot.clear_attached_bodies(link)
    }

    /// Rebuilds the attached-body primitives of every link.
    pub fn update_attached_bodies(&mut self) -> Result<(), EnvironmentError> {
        self.robot.update_attached_bodies()
    }

    /// Every body attached to a collision link.
    pub fn attached_bodies(&self) -> Vec<&AttachedBodyModel> {
        self.robot.attached_bodies()
    }

    /// The bodies attached to the link `link`.
    pub fn attached_bodies_of(&self, link: &str) -> &[AttachedBodyModel] {
        self.robot.attached_bodies_of(link)
    }

    /// Enables or disables collision checking for `link`, returning the
    /// previous state if the link is known.
    pub fn set_collision_check(&mut self, link: &str, enabled: bool) -> Option<bool> {
        self.robot.set_collision_check(link, enabled)
    }

    /// Enables or disables collision checking for every link of `links`.
    pub fn set_collision_check_links(&mut self, links: &[String], enabled: bool) {
        self.robot.set_collision_check_links(links, enabled)
    }

    /// Sets collision checking to `enabled` for `links` and to `!enabled` for
    /// every other link.
    pub fn set_collision_check_only_links(&mut self, links: &[String], enabled: bool) {
        self.robot.set_collision_check_only_links(links, enabled)
    }

    /// Enables or disables collision checking for every link.
    pub fn set_collision_check_all(&mut self, enabled: bool) {
        self.robot.set_collision_check_all(enabled)
    }

    /// Whether collisions are checked for `link`.
    pub fn collision_check(&self, link: &str) -> Option<bool> {
        self.robot.collision_check(link)
    }

    /// Enables or disables the self-collision phase of [`Self::is_collision`]
    /// and [`Self::collision_contacts`].
    pub fn set_self_collision(&mut self, enabled: bool) {
        self.self_collision = enabled;
    }

    /// Whether robot self-collisions are checked by the full queries.
    pub fn self_collision(&self) -> bool {
        self.self_collision
    }

    /// Logs every collision found between the robot and the world.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Whether world collisions are logged.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /*
     * Permissions.
     */
    /// The self-collision matrix of the robot.
    pub fn self_collision_matrix(&self) -> &SelfCollisionMatrix {
        self.robot.self_collision_matrix()
    }

    /// Enables self-collision checks between the links of `group1` and those of `group2`.
    pub fn add_self_collision_group(&mut self, group1: &[String], group2: &[String]) {
        self.robot.add_self_collision_group(group1, group2)
    }

    /// Disables self-collision checks between the links of `group1` and those of `group2`.
    pub fn remove_self_collision_group(&mut self, group1: &[String], group2: &[String]) {
        self.robot.remove_self_collision_group(group1, group2)
    }

    /// Overrides every robot permission with `matrix`.
    ///
    /// Namespace rows are honored by the world phase while the override is
    /// active. Fails, leaving the permissions unchanged, if `matrix` is
    /// malformed.
    pub fn set_allowed_collision_matrix(
        &mut self,
        matrix: AllowedCollisionMatrix,
    ) -> Result<(), EnvironmentError> {
        matrix.validate()?;
        self.robot.set_allowed_collision_matrix(matrix);
        Ok(())
    }

    /// Restores the permissions active before the last call to
    /// [`Self::set_allowed_collision_matrix`].
    pub fn revert_allowed_collision_matrix(&mut self) {
        self.robot.revert_allowed_collision_matrix()
    }

    /// The override matrix if one is active, the derived matrix otherwise.
    pub fn allowed_collision_matrix(&self) -> AllowedCollisionMatrix {
        match self.robot.collision_matrix_override() {
            Some(matrix) => matrix.clone(),
            None => self.default_allowed_collision_matrix(),
        }
    }

    /// The matrix derived from the current robot permissions, covering the
    /// collision links, then the namespaces, then the attached bodies.
    pub fn default_allowed_collision_matrix(&self) -> AllowedCollisionMatrix {
        self.robot
            .default_allowed_collision_matrix(self.world.objects().namespaces())
    }

    /// The pairs of collision link indices whose permissions disagree.
    pub fn asymmetric_link_pairs(&self) -> Vec<(usize, usize)> {
        self.robot.asymmetric_link_pairs()
    }

    /*
     * World.
     */
    /// The world obstacles.
    pub fn world(&self) -> &WorldGeometry {
        &self.world
    }

    /// The registry of the world objects.
    pub fn objects(&self) -> &EnvironmentObjects {
        self.world.objects()
    }

    /// Adds one object to the namespace `ns`.
    pub fn add_object(
        &mut self,
        ns: &str,
        shape: Shape,
        pose: Isometry<Real>,
    ) -> Result<u64, EnvironmentError> {
        self.world.add_object(ns, shape, pose)
    }

    /// Adds one untransformable object to the namespace `ns`.
    pub fn add_static_object(
        &mut self,
        ns: &str,
        shape: StaticShape,
    ) -> Result<u64, EnvironmentError> {
        self.world.add_static_object(ns, shape)
    }

    /// Adds a batch of objects to the namespace `ns`, indexed for fast queries.
    pub fn add_objects(
        &mut self,
        ns: &str,
        shapes: Vec<Shape>,
        poses: Vec<Isometry<Real>>,
    ) -> Result<Vec<u64>, EnvironmentError> {
        self.world.add_objects(ns, shapes, poses)
    }

    /// Removes every world object.
    pub fn clear_objects(&mut self) {
        self.world.clear();
    }

    /// Removes every object of the namespace `ns`.
    pub fn clear_namespace(&mut self, ns: &str) {
        self.world.clear_namespace(ns);
    }

    /// Removes the world objects touching `shape` placed at `pose`.
    pub fn remove_colliding_objects(
        &mut self,
        shape: &Shape,
        pose: Isometry<Real>,
    ) -> Result<usize, EnvironmentError> {
        self.world
            .remove_colliding_objects(shape, pose, &*self.narrow_phase)
    }

    /// Removes the world objects touching the untransformable `shape`.
    pub fn remove_colliding_static_objects(
        &mut self,
        shape: &StaticShape,
    ) -> Result<usize, EnvironmentError> {
        self.world
            .remove_colliding_static_objects(shape, &*self.narrow_phase)
    }

    /*
     * Queries.
     */
    /// Returns `true` if two enabled robot links collide, regardless of
    /// [`Self::self_collision`].
    pub fn is_self_collision(&self) -> bool {
        ensure_thread_ready();
        let mut query = CollisionQuery::boolean(self);
        query.run_self_phase();
        query.collides()
    }

    /// Returns `true` if the robot collides with itself or with the world.
    pub fn is_collision(&self) -> bool {
        ensure_thread_ready();
        let mut query = CollisionQuery::boolean(self);
        self.run(&mut query);
        query.collides()
    }

    /// Gathers up to `max_count` contacts (all of them if `max_count` is `0`)
    /// of the robot with itself and with the world.
    ///
    /// Contacts between a link listed by one of the `allowed` regions and a
    /// world object, located inside the region and shallower than its depth,
    /// are ignored.
    pub fn collision_contacts(
        &self,
        allowed: &[AllowedContact],
        max_count: usize,
    ) -> ContactReport {
        ensure_thread_ready();
        let mut query = CollisionQuery::gathering(self, allowed, max_count);
        self.run(&mut query);
        query.into_report()
    }

    fn run(&self, query: &mut CollisionQuery) {
        if self.self_collision {
            query.run_self_phase();
        }

        if !query.is_done() {
            query.run_world_phase();
        }
    }
}

impl Clone for CollisionEnvironment {
    fn clone(&self) -> Self {
        let robot = match self.robot.rebuilt() {
            Ok(robot) => robot,
            Err(e) => {
                log::error!(
                    "Failed to rebuild the robot geometry of a clone ({}), duplicating it instead.",
                    e
                );
                self.robot.duplicated()
            }
        };

        Self {
            _backend: self._backend.clone(),
            robot,
            world: self.world.duplicated(),
            narrow_phase: self.narrow_phase.clone(),
            self_collision: self.self_collision,
            verbose: self.verbose,
        }
    }
}
