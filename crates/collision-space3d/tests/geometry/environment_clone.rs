use collision_space3d::backend::live_references;
use collision_space3d::kinematics::{AttachedBodyModel, LinkModel, RobotModel, RobotState};
use collision_space3d::math::Isometry;
use collision_space3d::robot::RobotCollisionParams;
use collision_space3d::shapes::Shape;
use collision_space3d::CollisionEnvironment;

fn arm_in_a_cell() -> CollisionEnvironment {
    let mut tool = LinkModel::new("tool", Some(Shape::cylinder(0.05, 0.3)));
    tool.attached_bodies.push(AttachedBodyModel::new(
        "part",
        vec![Shape::cuboid(0.1, 0.1, 0.1)],
        vec!["tool".to_string()],
    ));
    let model = RobotModel::new(vec![LinkModel::new("base", Some(Shape::sphere(0.2))), tool]);
    let params = RobotCollisionParams::new(["base", "tool"]).with_default_padding(0.01);

    let mut env = CollisionEnvironment::new();
    env.bind_robot_model(model, params).unwrap();

    let mut state = RobotState::new();
    state.set_link_transform("base", Isometry::identity());
    state.set_link_transform("tool", Isometry::translation(1.0, 0.0, 0.0));
    state.set_attached_body_transforms("tool", 0, vec![Isometry::translation(1.0, 0.0, -0.2)]);
    env.update_robot_model(&state);

    let _ = env
        .add_objects(
            "fixture",
            vec![Shape::cuboid(0.2, 0.2, 0.2), Shape::sphere(0.1)],
            vec![
                Isometry::translation(1.0, 0.0, -0.3),
                Isometry::translation(5.0, 5.0, 5.0),
            ],
        )
        .unwrap();
    env
}

#[test]
fn clone_keeps_objects_deleted_from_the_source() {
    let mut env = arm_in_a_cell();
    assert!(env.is_collision());
    let before = env.collision_contacts(&[], 0);
    let copy = env.clone();

    let removed = env
        .remove_colliding_objects(&Shape::sphere(0.15), Isometry::translation(1.0, 0.0, -0.3))
        .unwrap();
    assert_eq!(removed, 1);
    assert!(!env.is_collision());

    assert!(copy.is_collision());
    assert_eq!(copy.collision_contacts(&[], 0), before);
    assert_eq!(copy.objects().objects("fixture").len(), 2);
    assert_eq!(env.objects().objects("fixture").len(), 1);
    assert_eq!(copy.world().namespace("fixture").unwrap().len(), 2);
}

#[test]
fn clone_is_independent_from_later_changes() {
    let mut env = arm_in_a_cell();
    let _ = env.set_collision_check("base", false);
    let copy = env.clone();

    assert_eq!(copy.collision_check("base"), Some(false));
    assert_eq!(copy.link_padding("tool"), Some(0.01));
    assert_eq!(copy.attached_bodies_of("tool").len(), 1);

    let mut state = RobotState::new();
    state.set_link_transform("tool", Isometry::translation(-9.0, 0.0, 0.0));
    state.set_attached_body_transforms("tool", 0, vec![Isometry::translation(-9.0, 0.0, 0.0)]);
    env.update_robot_model(&state);
    env.clear_objects();

    assert!(!env.is_collision());
    assert!(copy.is_collision());
    let report = copy.collision_contacts(&[], 0);
    assert!(report
        .contacts
        .iter()
        .all(|c| c.object_name.as_deref() == Some("fixture")));
}

#[test]
fn clones_hold_their_own_backend_reference() {
    let env = arm_in_a_cell();
    let copy = env.clone();
    assert!(live_references() >= 2);
    drop(copy);
    assert!(live_references() >= 1);
}
