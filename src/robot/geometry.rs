use crate::environment::EnvironmentError;
use crate::geometry::{
    build_primitive, PrimitiveArena, PrimitiveBlueprint, PrimitiveHandle, PrimitiveOwner,
};
use crate::kinematics::{AttachedBodyModel, KinematicState, RobotModel};
use crate::math::Real;
use crate::permissions::{
    asymmetric_link_pairs, AllowedCollisionMatrix, AllowedTouch, SelfCollisionMatrix,
};
use std::collections::HashMap;

use super::params::{body_padding, link_padding, ATTACHED_PADDING_KEY};
use super::{LinkGeometry, RobotCollisionParams};

/// The collision geometry of a robot: one [`LinkGeometry`] per collision
/// link with a shape, the primitives they own, and the permission tables
/// telling which self-contacts are expected.
#[derive(Default)]
pub struct RobotGeometry {
    model: RobotModel,
    params: RobotCollisionParams,
    // The padding map in use, i.e., the bound one overridden by
    // `set_padding`.
    padding: HashMap<String, Real>,
    link_indices: HashMap<String, usize>,
    links: Vec<LinkGeometry>,
    arena: PrimitiveArena,
    self_collision: SelfCollisionMatrix,
    collision_matrix: Option<AllowedCollisionMatrix>,
    previous_collision_matrix: Option<AllowedCollisionMatrix>,
}

impl RobotGeometry {
    /// Builds the collision geometry of `model`.
    ///
    /// Collision links unknown to the model or without a shape are skipped.
    /// The self-collision matrix starts with every check disabled.
    pub fn bind(model: RobotModel, params: RobotCollisionParams) -> Result<Self, EnvironmentError> {
        let link_indices = params
            .collision_links
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let mut result = Self {
            padding: params.link_padding.clone(),
            self_collision: SelfCollisionMatrix::new(params.collision_links.len()),
            link_indices,
            model,
            params,
            ..Self::default()
        };

        for (index, name) in result.params.collision_links.iter().enumerate() {
            let shape = match result.model.link(name) {
                Some(link) => match &link.shape {
                    Some(shape) => shape,
                    None => continue,
                },
                None => {
                    log::warn!("Collision link '{}' is not part of the robot model.", name);
                    continue;
                }
            };

            let padding = link_padding(&result.padding, result.params.default_padding, name);
            log::debug!("Link '{}' padding {}.", name, padding);
            let blueprint = build_primitive(shape, result.params.scale, padding)
                .ok_or_else(|| EnvironmentError::UnsupportedShape {
                    owner: name.clone(),
                })?;

            let slot = result.links.len();
            let handle = result.arena.insert(
                blueprint,
                PrimitiveOwner::Link {
                    slot,
                    attached_body: 0,
                },
            );
            let mut link = LinkGeometry::new(name.clone(), index, handle);
            link.padding = padding;
            result.links.push(link);
        }

        for slot in 0..result.links.len() {
            result.rebuild_attached_bodies(slot)?;
        }
        result.rebuild_allowed_touch();

        Ok(result)
    }

    /// Builds the collision geometry again from a copy of the robot model,
    /// with the same padding, poses, enabled flags and permissions.
    pub fn rebuilt(&self) -> Result<Self, EnvironmentError> {
        let mut result = Self::bind(self.model.clone(), self.params.clone())?;
        result.apply_padding(self.padding.clone())?;

        for (copy, link) in result.links.iter_mut().zip(&self.links) {
            copy.enabled = link.enabled;
            for (new, old) in copy.primitives.iter().zip(&link.primitives) {
                if let (Some(new), Some(old)) = (result.arena.get_mut(*new), self.arena.get(*old)) {
                    new.set_pose(*old.pose());
                }
            }
        }

        result.self_collision = self.self_collision.clone();
        result.collision_matrix = self.collision_matrix.clone();
        result.previous_collision_matrix = self.previous_collision_matrix.clone();
        result.rebuild_allowed_touch();
        Ok(result)
    }

    /// Duplicates every primitive of this geometry into a new arena.
    ///
    /// Unlike [`Self::rebuilt`], this never goes through the shape factory.
    pub fn duplicated(&self) -> Self {
        let mut arena = PrimitiveArena::new();
        let mut links = Vec::with_capacity(self.links.len());

        for link in &self.links {
            let mut copy = link.clone();
            copy.primitives.clear();
            copy.attached_ordinals.clear();

            let mut has_own_primitive = true;
            for (i, handle) in link.primitives.iter().enumerate() {
                let owner = PrimitiveOwner::Link {
                    slot: links.len(),
                    attached_body: link.attached_ordinal(*handle).unwrap_or(0),
                };
                match self.arena.duplicate_into(*handle, &mut arena, owner) {
                    Some(duplicate) => {
                        copy.primitives.push(duplicate);
                        if let Some(ordinal) = link.attached_ordinal(*handle) {
                            let _ = copy.attached_ordinals.insert(duplicate, ordinal);
                        }
                    }
                    None => {
                        log::error!("Failed to duplicate a primitive of link '{}'.", link.name);
                        has_own_primitive &= i != 0;
                    }
                }
            }

            if !has_own_primitive {
                arena.release_all(copy.primitives.drain(..));
                continue;
            }

            links.push(copy);
        }

        Self {
            model: self.model.clone(),
            params: self.params.clone(),
            padding: self.padding.clone(),
            link_indices: self.link_indices.clone(),
            links,
            arena,
            self_collision: self.self_collision.clone(),
            collision_matrix: self.collision_matrix.clone(),
            previous_collision_matrix: self.previous_collision_matrix.clone(),
        }
    }

    /// The robot model this geometry was built from, attached bodies included.
    pub fn model(&self) -> &RobotModel {
        &self.model
    }

    /// The parameters this geometry was bound with.
    pub fn params(&self) -> &RobotCollisionParams {
        &self.params
    }

    /// The geometry of every link with a shape, in collision link order.
    pub fn links(&self) -> &[LinkGeometry] {
        &self.links
    }

    /// The geometry stored at `slot`.
    pub fn link(&self, slot: usize) -> Option<&LinkGeometry> {
        self.links.get(slot)
    }

    /// The slot of the link named `name`.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.links.iter().position(|l| l.name == name)
    }

    /// The geometry of the link named `name`.
    pub fn link_by_name(&self, name: &str) -> Option<&LinkGeometry> {
        self.links.iter().find(|l| l.name == name)
    }

    /// The collision link index of every collision link.
    pub fn link_indices(&self) -> &HashMap<String, usize> {
        &self.link_indices
    }

    /// The primitives of the robot.
    pub fn arena(&self) -> &PrimitiveArena {
        &self.arena
    }

    /// The link owning `primitive`, with the ordinal of the attached body
    /// owning it (`0` for the link's own shape).
    pub fn owner_of(&self, primitive: PrimitiveHandle) -> Option<(&LinkGeometry, usize)> {
        match self.arena.get(primitive)?.owner() {
            PrimitiveOwner::Link {
                slot,
                attached_body,
            } => Some((self.links.get(*slot)?, *attached_body)),
            _ => None,
        }
    }

    /// Places every link and attached-body primitive according to `state`.
    ///
    /// Links without a state keep their previous pose.
    pub fn update<S: KinematicState + ?Sized>(&mut self, state: &S) {
        for link in &self.links {
            let link_state = match state.link_state(&link.name) {
                Some(link_state) => link_state,
                None => {
                    log::warn!("No link state for link '{}'.", link.name);
                    continue;
                }
            };

            if let Some(primitive) = self.arena.get_mut(link.link_primitive()) {
                primitive.set_pose(link_state.collision_transform);
            }

            let mut body = 0;
            let mut shape = 0;
            for handle in link.attached_primitives() {
                let ordinal = link.attached_ordinal(*handle).unwrap_or(0);
                if ordinal != body {
                    body = ordinal;
                    shape = 0;
                }

                let pose = ordinal
                    .checked_sub(1)
                    .and_then(|b| link_state.attached_body_transforms.get(b))
                    .and_then(|poses| poses.get(shape));
                if let (Some(pose), Some(primitive)) = (pose, self.arena.get_mut(*handle)) {
                    primitive.set_pose(*pose);
                }
                shape += 1;
            }
        }
    }

    /// The padding applied to the link or attached body `name`.
    pub fn padding_of(&self, name: &str) -> Option<Real> {
        if let Some(link) = self.link_by_name(name) {
            return Some(link.padding);
        }

        self.attached_bodies()
            .iter()
            .any(|b| b.name == name)
            .then(|| body_padding(&self.padding, self.params.default_padding, name))
    }

    fn is_paddable(&self, name: &str) -> bool {
        name == ATTACHED_PADDING_KEY
            || self.link_by_name(name).is_some()
            || self.attached_bodies().iter().any(|b| b.name == name)
    }

    /// Overrides the padding of some links or attached bodies.
    ///
    /// Unknown names are skipped with a warning. Only the primitives whose
    /// padding actually changes are rebuilt.
    pub fn set_padding(&mut self, padding: &HashMap<String, Real>) -> Result<(), EnvironmentError> {
        let mut new_padding = self.padding.clone();
        for (name, value) in padding {
            if self.is_paddable(name) {
                let _ = new_padding.insert(name.clone(), *value);
            } else {
                log::warn!("Cannot set the padding of unknown link or body '{}'.", name);
            }
        }

        self.apply_padding(new_padding)
    }

    /// Restores the padding this geometry was bound with.
    pub fn revert_padding(&mut self) -> Result<(), EnvironmentError> {
        self.apply_padding(self.params.link_padding.clone())
    }

    // Every new primitive is built before anything is replaced, so a padding
    // that cannot be applied leaves the geometry untouched.
    fn apply_padding(&mut self, padding: HashMap<String, Real>) -> Result<(), EnvironmentError> {
        let default = self.params.default_padding;
        let mut link_rebuilds = vec![];
        let mut body_rebuilds = vec![];

        for (slot, link) in self.links.iter().enumerate() {
            let new_link_padding = link_padding(&padding, default, &link.name);
            if new_link_padding != link.padding {
                log::debug!(
                    "Setting padding of link '{}' from {} to {}.",
                    link.name,
                    link.padding,
                    new_link_padding
                );
                let blueprint = self.link_blueprint(slot, new_link_padding)?;
                link_rebuilds.push((slot, blueprint, new_link_padding));
            }

            let bodies_changed = self.model.link(&link.name).map_or(false, |model| {
                model.attached_bodies.iter().any(|b| {
                    body_padding(&self.padding, default, &b.name)
                        != body_padding(&padding, default, &b.name)
                })
            });
            if bodies_changed {
                body_rebuilds.push((slot, self.attached_blueprints(slot, &padding)?));
            }
        }

        self.padding = padding;
        for (slot, blueprint, link_padding) in link_rebuilds {
            self.install_link_primitive(slot, blueprint, link_padding);
        }
        for (slot, blueprints) in body_rebuilds {
            self.install_attached_bodies(slot, blueprints);
        }

        self.rebuild_allowed_touch();
        Ok(())
    }

    fn link_blueprint(
        &self,
        slot: usize,
        padding: Real,
    ) -> Result<PrimitiveBlueprint, EnvironmentError> {
        let name = &self.links[slot].name;
        let shape = self
            .model
            .link(name)
            .and_then(|l| l.shape.as_ref())
            .ok_or_else(|| EnvironmentError::UnknownLink(name.clone()))?;
        build_primitive(shape, self.params.scale, padding)
            .ok_or_else(|| EnvironmentError::UnsupportedShape { owner: name.clone() })
    }

    fn install_link_primitive(
        &mut self,
        slot: usize,
        blueprint: PrimitiveBlueprint,
        padding: Real,
    ) {
        let link = &mut self.links[slot];
        let old = link.link_primitive();
        let pose = self.arena.get(old).map(|p| *p.pose());
        let _ = self.arena.release(old);

        let handle = self.arena.insert(
            blueprint,
            PrimitiveOwner::Link {
                slot,
                attached_body: 0,
            },
        );
        if let (Some(pose), Some(primitive)) = (pose, self.arena.get_mut(handle)) {
            primitive.set_pose(pose);
        }
        link.primitives[0] = handle;
        link.padding = padding;
    }

    // The primitives of the bodies attached to a link in the model, tagged
    // with their attached-body ordinal.
    fn attached_blueprints(
        &self,
        slot: usize,
        padding: &HashMap<String, Real>,
    ) -> Result<Vec<(usize, PrimitiveBlueprint)>, EnvironmentError> {
        let bodies = self
            .model
            .link(&self.links[slot].name)
            .map(|l| &l.attached_bodies[..])
            .unwrap_or(&[]);

        let mut blueprints = vec![];
        for (j, body) in bodies.iter().enumerate() {
            let padding = body_padding(padding, self.params.default_padding, &body.name);
            log::debug!("Padding of attached body '{}' set to {}.", body.name, padding);
            for shape in &body.shapes {
                let blueprint = build_primitive(shape, self.params.scale, padding).ok_or_else(|| {
                    EnvironmentError::UnsupportedShape {
                        owner: body.name.clone(),
                    }
                })?;
                blueprints.push((j + 1, blueprint));
            }
        }

        Ok(blueprints)
    }

    fn install_attached_bodies(
        &mut self,
        slot: usize,
        blueprints: Vec<(usize, PrimitiveBlueprint)>,
    ) {
        let link = &mut self.links[slot];
        let old_poses: Vec<_> = link
            .attached_primitives()
            .iter()
            .map(|h| self.arena.get(*h).map(|p| *p.pose()))
            .collect();
        self.arena.release_all(link.primitives.drain(1..));
        link.attached_ordinals.clear();

        for (i, (ordinal, blueprint)) in blueprints.into_iter().enumerate() {
            let handle = self.arena.insert(
                blueprint,
                PrimitiveOwner::Link {
                    slot,
                    attached_body: ordinal,
                },
            );
            if let (Some(Some(pose)), Some(primitive)) =
                (old_poses.get(i), self.arena.get_mut(handle))
            {
                primitive.set_pose(*pose);
            }
            link.primitives.push(handle);
            let _ = link.attached_ordinals.insert(handle, ordinal);
        }
    }

    // Replaces the attached-body primitives of a link by new ones built from
    // the model. Nothing changes if one of the new primitives cannot be built.
    fn rebuild_attached_bodies(&mut self, slot: usize) -> Result<(), EnvironmentError> {
        let blueprints = self.attached_blueprints(slot, &self.padding)?;
        self.install_attached_bodies(slot, blueprints);
        Ok(())
    }

    /// Attaches `body` to the link named `link`.
    pub fn attach_body(
        &mut self,
        link: &str,
        body: AttachedBodyModel,
    ) -> Result<(), EnvironmentError> {
        let slot = self
            .slot_of(link)
            .ok_or_else(|| EnvironmentError::UnknownLink(link.to_string()))?;
        let model = self
            .model
            .link_mut(link)
            .ok_or_else(|| EnvironmentError::UnknownLink(link.to_string()))?;
        model.attached_bodies.push(body);

        if let Err(e) = self.rebuild_attached_bodies(slot) {
            if let Some(model) = self.model.link_mut(link) {
                let _ = model.attached_bodies.pop();
            }
            return Err(e);
        }

        self.rebuild_allowed_touch();
        Ok(())
    }

    /// Detaches every body from the link named `link`.
    pub fn clear_attached_bodies(&mut self, link: &str) -> Result<(), EnvironmentError> {
        let slot = self
            .slot_of(link)
            .ok_or_else(|| EnvironmentError::UnknownLink(link.to_string()))?;
        if let Some(model) = self.model.link_mut(link) {
            model.attached_bodies.clear();
        }

        self.rebuild_attached_bodies(slot)?;
        self.rebuild_allowed_touch();
        Ok(())
    }

    /// Rebuilds the attached-body primitives of every link from the model.
    pub fn update_attached_bodies(&mut self) -> Result<(), EnvironmentError> {
        for slot in 0..self.links.len() {
            self.rebuild_attached_bodies(slot)?;
        }
        self.rebuild_allowed_touch();
        Ok(())
    }

    /// Every body attached to a collision link.
    pub fn attached_bodies(&self) -> Vec<&AttachedBodyModel> {
        self.links
            .iter()
            .filter_map(|l| self.model.link(&l.name))
            .flat_map(|l| l.attached_bodies.iter())
            .collect()
    }

    /// The bodies attached to the link named `link`.
    pub fn attached_bodies_of(&self, link: &str) -> &[AttachedBodyModel] {
        match (self.link_by_name(link), self.model.link(link)) {
            (Some(_), Some(model)) => &model.attached_bodies,
            _ => &[],
        }
    }

    /// Enables or disables collision checking for the link `link`.
    ///
    /// Returns the previous state, or `None` if the link is unknown.
    pub fn set_collision_check(&mut self, link: &str, enabled: bool) -> Option<bool> {
        let link = self.links.iter_mut().find(|l| l.name == link)?;
        Some(core::mem::replace(&mut link.enabled, enabled))
    }

    /// Enables or disables collision checking for every link of `names`.
    pub fn set_collision_check_links(&mut self, names: &[String], enabled: bool) {
        for link in &mut self.links {
            if names.contains(&link.name) {
                link.enabled = enabled;
            }
        }
    }

    /// Sets collision checking to `enabled` for the links of `names`, and to
    /// `!enabled` for all the others. Does nothing if `names` is empty.
    pub fn set_collision_check_only_links(&mut self, names: &[String], enabled: bool) {
        if names.is_empty() {
            return;
        }

        for link in &mut self.links {
            link.enabled = if names.contains(&link.name) {
                enabled
            } else {
                !enabled
            };
        }
    }

    /// Enables or disables collision checking for every link.
    pub fn set_collision_check_all(&mut self, enabled: bool) {
        for link in &mut self.links {
            link.enabled = enabled;
        }
    }

    /// Whether collisions are checked for `link`, or `None` if it is unknown.
    pub fn collision_check(&self, link: &str) -> Option<bool> {
        self.link_by_name(link).map(|l| l.enabled)
    }

    /// The self-collision matrix.
    pub fn self_collision_matrix(&self) -> &SelfCollisionMatrix {
        &self.self_collision
    }

    /// Enables self-collision checks between the links of `group1` and those of `group2`.
    pub fn add_self_collision_group(&mut self, group1: &[String], group2: &[String]) {
        self.self_collision
            .add_group(&self.link_indices, group1, group2);
        self.rebuild_allowed_touch();
    }

    /// Disables self-collision checks between the links of `group1` and those of `group2`.
    pub fn remove_self_collision_group(&mut self, group1: &[String], group2: &[String]) {
        self.self_collision
            .remove_group(&self.link_indices, group1, group2);
        self.rebuild_allowed_touch();
    }

    /// The allowed-collision matrix overriding the self-collision matrix, if any.
    pub fn collision_matrix_override(&self) -> Option<&AllowedCollisionMatrix> {
        self.collision_matrix.as_ref()
    }

    /// Overrides the allowed-touch tables with `matrix`.
    ///
    /// The current override, if any, is saved and restored by
    /// [`Self::revert_allowed_collision_matrix`].
    pub fn set_allowed_collision_matrix(&mut self, matrix: AllowedCollisionMatrix) {
        self.previous_collision_matrix = self.collision_matrix.replace(matrix);
        self.rebuild_allowed_touch();
    }

    /// Restores the override that was active before the last call to
    /// [`Self::set_allowed_collision_matrix`], normally none.
    pub fn revert_allowed_collision_matrix(&mut self) {
        self.collision_matrix = self.previous_collision_matrix.take();
        self.rebuild_allowed_touch();
    }

    /// Recomputes the allowed-touch table of every link, from the override
    /// when one is active, else from the self-collision matrix.
    pub fn rebuild_allowed_touch(&mut self) {
        let num_links = self.params.collision_links.len();

        for link in &mut self.links {
            let bodies = self
                .model
                .link(&link.name)
                .map(|l| &l.attached_bodies[..])
                .unwrap_or(&[]);

            link.allowed_touch = match &self.collision_matrix {
                Some(matrix) => AllowedTouch::from_override(
                    matrix,
                    &link.name,
                    link.index,
                    bodies,
                    num_links,
                    &link.allowed_touch,
                ),
                None => AllowedTouch::from_self_collision(
                    &self.self_collision,
                    link.index,
                    bodies,
                    &self.link_indices,
                    num_links,
                ),
            };
        }
    }

    /// The matrix derived from the current allowed-touch tables, covering
    /// the collision links, then `namespaces`, then the attached bodies.
    pub fn default_allowed_collision_matrix<'a>(
        &self,
        namespaces: impl IntoIterator<Item = &'a str>,
    ) -> AllowedCollisionMatrix {
        let num_links = self.params.collision_links.len();
        let link_rows: Vec<Vec<bool>> = (0..num_links)
            .map(|i| match self.links.iter().find(|l| l.index == i) {
                Some(link) => {
                    let mut row = link.allowed_touch.link_row().to_vec();
                    row.resize(num_links, false);
                    row
                }
                None => (0..num_links)
                    .map(|j| self.self_collision.touch_allowed(i, j))
                    .collect(),
            })
            .collect();

        AllowedCollisionMatrix::derive(
            &self.params.collision_links,
            &link_rows,
            namespaces,
            self.attached_bodies(),
        )
    }

    /// The pairs of collision link indices whose link rows disagree.
    pub fn asymmetric_link_pairs(&self) -> Vec<(usize, usize)> {
        asymmetric_link_pairs(self.links.iter().map(|l| (l.index, &l.allowed_touch)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kinematics::{LinkModel, RobotState};
    use crate::math::{Isometry, Vector};
    use crate::shapes::Shape;

    fn arm() -> RobotModel {
        let mut hand = LinkModel::new("hand", Some(Shape::sphere(0.1)));
        hand.attached_bodies.push(AttachedBodyModel::new(
            "cup",
            vec![Shape::cuboid(0.1, 0.1, 0.1), Shape::sphere(0.05)],
            vec!["hand".to_string()],
        ));
        RobotModel::new(vec![
            LinkModel::new("base", Some(Shape::cuboid(1.0, 1.0, 0.2))),
            LinkModel::new("virtual", None),
            LinkModel::new("elbow", Some(Shape::cylinder(0.1, 0.5))),
            hand,
        ])
    }

    fn params() -> RobotCollisionParams {
        RobotCollisionParams::new(["base", "virtual", "elbow", "hand", "missing"])
            .with_default_padding(0.01)
    }

    fn link_radius(robot: &RobotGeometry, name: &str) -> Real {
        let link = robot.link_by_name(name).unwrap();
        let aabb = robot.arena().get(link.link_primitive()).unwrap().aabb();
        aabb.half_extents().x
    }

    #[test]
    fn bind_skips_links_without_geometry() {
        let robot = RobotGeometry::bind(arm(), params()).unwrap();
        let names: Vec<_> = robot.links().iter().map(|l| l.name()).collect();
        assert_eq!(names, ["base", "elbow", "hand"]);
        assert_eq!(robot.link_by_name("hand").unwrap().index(), 3);

        let hand = robot.link_by_name("hand").unwrap();
        assert_eq!(hand.primitives().len(), 3);
        for handle in hand.attached_primitives() {
            assert_eq!(hand.attached_ordinal(*handle), Some(1));
        }
        assert_eq!(hand.attached_ordinal(hand.link_primitive()), None);
        assert_eq!(robot.arena().len(), 5);
    }

    #[test]
    fn unsupported_link_shape_is_an_error() {
        let model = RobotModel::new(vec![LinkModel::new("bad", Some(Shape::mesh(vec![], vec![])))]);
        assert_eq!(
            RobotGeometry::bind(model, RobotCollisionParams::new(["bad"])).err(),
            Some(EnvironmentError::UnsupportedShape {
                owner: "bad".to_string()
            })
        );
    }

    #[test]
    fn touch_links_are_allowed_for_attached_bodies() {
        let robot = RobotGeometry::bind(arm(), params()).unwrap();
        let touch = robot.link_by_name("hand").unwrap().allowed_touch();
        assert_eq!(touch.body_row(1), Some(&[false, false, false, true, false][..]));
        // Every self-collision check starts disabled.
        assert!(touch.link_row().iter().all(|allowed| *allowed));
    }

    #[test]
    fn padding_changes_only_rebuild_changed_links() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        let base = robot.link_by_name("base").unwrap().link_primitive();
        assert_relative_eq!(link_radius(&robot, "hand"), 0.11);

        let padding = [
            ("hand".to_string(), 0.2),
            ("nowhere".to_string(), 1.0),
        ]
        .into_iter()
        .collect();
        robot.set_padding(&padding).unwrap();

        assert_eq!(robot.link_by_name("base").unwrap().link_primitive(), base);
        assert_relative_eq!(link_radius(&robot, "base"), 0.51);
        assert_relative_eq!(link_radius(&robot, "hand"), 0.3);
        assert_eq!(robot.padding_of("hand"), Some(0.2));
        assert_eq!(robot.padding_of("cup"), Some(0.01));
        assert_eq!(robot.padding_of("nowhere"), None);
        assert_eq!(robot.arena().len(), 5);

        robot.revert_padding().unwrap();
        assert_relative_eq!(link_radius(&robot, "hand"), 0.11);
    }

    #[test]
    fn rejected_padding_leaves_every_link_untouched() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        // The base is rebuilt before the hand, whose sphere collapses.
        let padding = [("base".to_string(), 0.2), ("hand".to_string(), -1.0)]
            .into_iter()
            .collect();
        assert_eq!(
            robot.set_padding(&padding),
            Err(EnvironmentError::UnsupportedShape {
                owner: "hand".to_string()
            })
        );

        assert_relative_eq!(link_radius(&robot, "base"), 0.51);
        assert_relative_eq!(link_radius(&robot, "hand"), 0.11);
        assert_eq!(robot.padding_of("base"), Some(0.01));
        assert_eq!(robot.padding_of("hand"), Some(0.01));
        assert_eq!(robot.link_by_name("base").unwrap().padding(), 0.01);
        assert_eq!(robot.arena().len(), 5);
    }

    #[test]
    fn attached_body_padding_falls_back_to_the_shared_entry() {
        let params = params().with_link_padding(ATTACHED_PADDING_KEY, 0.5);
        let robot = RobotGeometry::bind(arm(), params).unwrap();
        assert_eq!(robot.padding_of("cup"), Some(0.5));
        assert_eq!(robot.padding_of("hand"), Some(0.01));
    }

    #[test]
    fn update_places_links_and_bodies() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        let mut state = RobotState::new();
        state.set_link_transform("hand", Isometry::translation(1.0, 0.0, 0.0));
        state.set_attached_body_transforms(
            "hand",
            0,
            vec![
                Isometry::translation(2.0, 0.0, 0.0),
                Isometry::translation(3.0, 0.0, 0.0),
            ],
        );
        robot.update(&state);

        let hand = robot.link_by_name("hand").unwrap();
        let centers: Vec<_> = hand
            .primitives()
            .iter()
            .map(|h| robot.arena().get(*h).unwrap().pose().translation.vector)
            .collect();
        assert_eq!(
            centers,
            vec![
                Vector::new(1.0, 0.0, 0.0),
                Vector::new(2.0, 0.0, 0.0),
                Vector::new(3.0, 0.0, 0.0)
            ]
        );

        let base = robot.link_by_name("base").unwrap().link_primitive();
        assert_eq!(*robot.arena().get(base).unwrap().pose(), Isometry::identity());
    }

    #[test]
    fn attaching_and_clearing_bodies() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        let tool = AttachedBodyModel::new("tool", vec![Shape::sphere(0.2)], vec![]);
        robot.attach_body("elbow", tool).unwrap();
        assert_eq!(robot.attached_bodies_of("elbow").len(), 1);
        assert_eq!(robot.attached_bodies().len(), 2);
        assert_eq!(robot.link_by_name("elbow").unwrap().primitives().len(), 2);

        let bad = AttachedBodyModel::new("bad", vec![Shape::mesh(vec![], vec![])], vec![]);
        assert!(robot.attach_body("elbow", bad).is_err());
        assert_eq!(robot.attached_bodies_of("elbow").len(), 1);

        assert_eq!(
            robot.attach_body("virtual", AttachedBodyModel::new("x", vec![], vec![])),
            Err(EnvironmentError::UnknownLink("virtual".to_string()))
        );

        robot.clear_attached_bodies("hand").unwrap();
        assert_eq!(robot.link_by_name("hand").unwrap().primitives().len(), 1);
        assert_eq!(robot.arena().len(), 4);
    }

    #[test]
    fn collision_check_toggles() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        assert_eq!(robot.set_collision_check("base", false), Some(true));
        assert_eq!(robot.set_collision_check("missing", false), None);
        assert_eq!(robot.collision_check("base"), Some(false));

        robot.set_collision_check_only_links(&["elbow".to_string()], true);
        assert_eq!(robot.collision_check("base"), Some(false));
        assert_eq!(robot.collision_check("elbow"), Some(true));
        assert_eq!(robot.collision_check("hand"), Some(false));

        robot.set_collision_check_links(&["hand".to_string()], true);
        assert_eq!(robot.collision_check("hand"), Some(true));

        robot.set_collision_check_all(false);
        assert!(robot.links().iter().all(|l| !l.is_enabled()));
    }

    #[test]
    fn collision_matrix_override_and_revert() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        let mut matrix = robot.default_allowed_collision_matrix(["table"]);
        assert_eq!(matrix.len(), 5 + 1 + 1);
        assert_eq!(matrix.allowed("cup", "hand"), Some(true));

        assert!(matrix.set_allowed("base", "elbow", false));
        robot.set_allowed_collision_matrix(matrix);
        assert!(!robot.link_by_name("base").unwrap().allowed_touch().link_allows(2));
        assert!(robot.asymmetric_link_pairs().is_empty());

        robot.revert_allowed_collision_matrix();
        assert!(robot.collision_matrix_override().is_none());
        assert!(robot.link_by_name("base").unwrap().allowed_touch().link_allows(2));
    }

    #[test]
    fn rebuilt_geometry_is_independent() {
        let mut robot = RobotGeometry::bind(arm(), params()).unwrap();
        let mut state = RobotState::new();
        state.set_link_transform("elbow", Isometry::translation(0.0, 5.0, 0.0));
        robot.update(&state);
        let _ = robot.set_collision_check("base", false);

        for copy in [robot.rebuilt().unwrap(), robot.duplicated()] {
            assert_eq!(copy.collision_check("base"), Some(false));
            assert_eq!(copy.arena().len(), robot.arena().len());
            let elbow = copy.link_by_name("elbow").unwrap().link_primitive();
            assert_eq!(
                copy.arena().get(elbow).unwrap().pose().translation.vector,
                Vector::new(0.0, 5.0, 0.0)
            );
        }
    }
}
