use crate::math::Real;
use std::collections::HashMap;

/// The key of [`RobotCollisionParams::link_padding`] applying to every
/// attached body without a padding of its own.
pub const ATTACHED_PADDING_KEY: &str = "attached";

/// How a robot model is turned into collision geometry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RobotCollisionParams {
    /// The links checked for collisions. The position of a link in this list
    /// is its collision link index.
    pub collision_links: Vec<String>,
    /// Padding of specific links or attached bodies.
    pub link_padding: HashMap<String, Real>,
    /// Padding of everything not listed in `link_padding`.
    pub default_padding: Real,
    /// Scale applied to the link and attached body shapes.
    pub scale: Real,
}

impl Default for RobotCollisionParams {
    fn default() -> Self {
        Self {
            collision_links: vec![],
            link_padding: HashMap::new(),
            default_padding: 0.0,
            scale: 1.0,
        }
    }
}

impl RobotCollisionParams {
    /// Parameters checking the given links, without padding.
    pub fn new<S: Into<String>>(collision_links: impl IntoIterator<Item = S>) -> Self {
        Self {
            collision_links: collision_links.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the padding of everything not listed in the padding map.
    pub fn with_default_padding(mut self, padding: Real) -> Self {
        self.default_padding = padding;
        self
    }

    /// Sets the padding of one link or attached body.
    pub fn with_link_padding(mut self, name: impl Into<String>, padding: Real) -> Self {
        let _ = self.link_padding.insert(name.into(), padding);
        self
    }

    /// Sets the shape scale.
    pub fn with_scale(mut self, scale: Real) -> Self {
        self.scale = scale;
        self
    }
}

/// The padding of a link, given the padding map in use.
pub(crate) fn link_padding(map: &HashMap<String, Real>, default: Real, link: &str) -> Real {
    map.get(link).copied().unwrap_or(default)
}

/// The padding of an attached body: its own entry, else the shared
/// attached-body entry, else the default.
pub(crate) fn body_padding(map: &HashMap<String, Real>, default: Real, body: &str) -> Real {
    map.get(body)
        .or_else(|| map.get(ATTACHED_PADDING_KEY))
        .copied()
        .unwrap_or(default)
}
