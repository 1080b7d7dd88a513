//! The kinematic robot model and state consumed by the collision environment.
//!
//! Computing link transforms from joint values is out of the scope of this
//! crate: a [`KinematicState`] only hands over the result.

use crate::math::{Isometry, Real};
use crate::shapes::Shape;
use std::collections::HashMap;

/// A body rigidly attached to a link, e.g., a held tool.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AttachedBodyModel {
    /// The body name.
    pub name: String,
    /// The collision shapes of the body.
    pub shapes: Vec<Shape>,
    /// The links this body is allowed to touch.
    pub touch_links: Vec<String>,
}

impl AttachedBodyModel {
    /// Creates a body with the given shapes, allowed to touch the given links.
    pub fn new(name: impl Into<String>, shapes: Vec<Shape>, touch_links: Vec<String>) -> Self {
        Self {
            name: name.into(),
            shapes,
            touch_links,
        }
    }
}

/// A rigid segment of the robot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LinkModel {
    /// The link name.
    pub name: String,
    /// The collision shape of the link, if it has one.
    pub shape: Option<Shape>,
    /// The bodies currently attached to this link.
    pub attached_bodies: Vec<AttachedBodyModel>,
}

impl LinkModel {
    /// A link without attached bodies.
    pub fn new(name: impl Into<String>, shape: Option<Shape>) -> Self {
        Self {
            name: name.into(),
            shape,
            attached_bodies: vec![],
        }
    }
}

/// The kinematic model of a robot, seen as a set of named links.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RobotModel {
    links: Vec<LinkModel>,
}

impl RobotModel {
    /// Creates a robot made of `links`.
    pub fn new(links: Vec<LinkModel>) -> Self {
        Self { links }
    }

    /// All the links of this robot.
    pub fn links(&self) -> &[LinkModel] {
        &self.links
    }

    /// The link named `name`.
    pub fn link(&self, name: &str) -> Option<&LinkModel> {
        self.links.iter().find(|l| l.name == name)
    }

    /// The link named `name`, mutably.
    pub fn link_mut(&mut self, name: &str) -> Option<&mut LinkModel> {
        self.links.iter_mut().find(|l| l.name == name)
    }
}

/// The placement of one link and of its attached bodies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LinkState {
    /// The world pose of the link's collision shape.
    pub collision_transform: Isometry<Real>,
    /// For each attached body of the link, the world pose of each of its shapes.
    pub attached_body_transforms: Vec<Vec<Isometry<Real>>>,
}

impl LinkState {
    /// A link placed at `pose`, without attached bodies.
    pub fn new(pose: Isometry<Real>) -> Self {
        Self {
            collision_transform: pose,
            attached_body_transforms: vec![],
        }
    }
}

/// Access to the current placement of the links of a robot.
pub trait KinematicState {
    /// The state of the link named `name`, if known.
    fn link_state(&self, name: &str) -> Option<&LinkState>;
}

/// A [`KinematicState`] backed by a map from link names to link states.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RobotState {
    links: HashMap<String, LinkState>,
}

impl RobotState {
    /// An empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the link `name` at `pose`, keeping the poses of its attached bodies.
    pub fn set_link_transform(&mut self, name: impl Into<String>, pose: Isometry<Real>) {
        let _ = self
            .links
            .entry(name.into())
            .and_modify(|state| state.collision_transform = pose)
            .or_insert_with(|| LinkState::new(pose));
    }

    /// Sets the poses of the shapes of the `body`-th attached body of `link`.
    pub fn set_attached_body_transforms(
        &mut self,
        link: impl Into<String>,
        body: usize,
        poses: Vec<Isometry<Real>>,
    ) {
        let state = self
            .links
            .entry(link.into())
            .or_insert_with(|| LinkState::new(Isometry::identity()));
        if state.attached_body_transforms.len() <= body {
            state.attached_body_transforms.resize(body + 1, vec![]);
        }
        state.attached_body_transforms[body] = poses;
    }

    /// Replaces the whole state of `name`.
    pub fn insert(&mut self, name: impl Into<String>, state: LinkState) {
        let _ = self.links.insert(name.into(), state);
    }
}

impl KinematicState for RobotState {
    fn link_state(&self, name: &str) -> Option<&LinkState> {
        self.links.get(name)
    }
}

impl<S: KinematicState + ?Sized> KinematicState for &S {
    fn link_state(&self, name: &str) -> Option<&LinkState> {
        (**self).link_state(name)
    }
}
