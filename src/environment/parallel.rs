use crate::kinematics::KinematicState;
use rayon::prelude::*;

use super::CollisionEnvironment;

impl CollisionEnvironment {
    /// Checks every robot state of `states` for collisions, in parallel.
    ///
    /// Each rayon worker evaluates its share of the states on its own clone
    /// of this environment.
    pub fn par_is_collision<S: KinematicState + Sync>(&self, states: &[S]) -> Vec<bool> {
        states
            .par_iter()
            .map_init(
                || self.clone(),
                |env, state| {
                    env.update_robot_model(state);
                    env.is_collision()
                },
            )
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::kinematics::{LinkModel, RobotModel, RobotState};
    use crate::math::{Isometry, Real};
    use crate::robot::RobotCollisionParams;
    use crate::shapes::Shape;
    use crate::CollisionEnvironment;

    #[test]
    fn parallel_results_match_sequential_ones() {
        let mut env = CollisionEnvironment::new();
        env.bind_robot_model(
            RobotModel::new(vec![LinkModel::new("probe", Some(Shape::sphere(0.4)))]),
            RobotCollisionParams::new(["probe"]),
        )
        .unwrap();
        let _ = env
            .add_object("wall", Shape::cuboid(0.5, 4.0, 4.0), Isometry::identity())
            .unwrap();

        let states: Vec<RobotState> = (0..64)
            .map(|i| {
                let mut state = RobotState::new();
                state.set_link_transform("probe", Isometry::translation(i as Real * 0.1, 0.0, 0.0));
                state
            })
            .collect();

        let parallel = env.par_is_collision(&states);
        let sequential: Vec<bool> = states
            .iter()
            .map(|state| {
                env.update_robot_model(state);
                env.is_collision()
            })
            .collect();

        assert_eq!(parallel, sequential);
        // The sphere leaves the wall once its center is past `x = 0.65`.
        assert_eq!(parallel.iter().filter(|c| **c).count(), 7);
    }
}
