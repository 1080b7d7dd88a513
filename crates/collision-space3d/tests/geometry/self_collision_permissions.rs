use collision_space3d::kinematics::{AttachedBodyModel, LinkModel, RobotModel, RobotState};
use collision_space3d::math::Isometry;
use collision_space3d::permissions::AllowedCollisionMatrix;
use collision_space3d::robot::RobotCollisionParams;
use collision_space3d::shapes::Shape;
use collision_space3d::CollisionEnvironment;

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// Two overlapping unit spheres.
fn two_links() -> CollisionEnvironment {
    let model = RobotModel::new(vec![
        LinkModel::new("shoulder", Some(Shape::sphere(1.0))),
        LinkModel::new("forearm", Some(Shape::sphere(1.0))),
    ]);
    let mut env = CollisionEnvironment::new();
    env.bind_robot_model(model, RobotCollisionParams::new(["shoulder", "forearm"]))
        .unwrap();

    let mut state = RobotState::new();
    state.set_link_transform("shoulder", Isometry::identity());
    state.set_link_transform("forearm", Isometry::translation(1.5, 0.0, 0.0));
    env.update_robot_model(&state);
    env
}

#[test]
fn two_links_collide_only_when_checked() {
    let mut env = two_links();
    assert!(!env.is_self_collision());
    assert!(env.collision_contacts(&[], 0).contacts.is_empty());

    env.add_self_collision_group(&names(&["shoulder"]), &names(&["forearm"]));
    assert!(env.is_self_collision());
    let report = env.collision_contacts(&[], 0);
    assert!(report.collides);
    assert!(!report.terminated_early);
    let contact = &report.contacts[0];
    let mut links = [contact.link1.clone().unwrap(), contact.link2.clone().unwrap()];
    links.sort();
    assert_eq!(links, ["forearm".to_string(), "shoulder".to_string()]);
    assert!(contact.object_name.is_none());

    env.remove_self_collision_group(&names(&["forearm"]), &names(&["shoulder"]));
    assert!(!env.is_self_collision());
}

#[test]
fn asymmetric_permissions_are_reported_and_suppress_both_ways() {
    let mut env = two_links();
    let indices = [("shoulder".to_string(), 0), ("forearm".to_string(), 1)]
        .into_iter()
        .collect();
    // The shoulder may touch the forearm, but not the other way around.
    let matrix =
        AllowedCollisionMatrix::new(vec![vec![false, true], vec![false, false]], indices).unwrap();
    env.set_allowed_collision_matrix(matrix).unwrap();

    assert_eq!(env.asymmetric_link_pairs(), vec![(0, 1)]);
    assert!(!env.is_self_collision());

    env.revert_allowed_collision_matrix();
    assert!(env.asymmetric_link_pairs().is_empty());
}

#[test]
fn bodies_attached_to_the_same_link_never_collide() {
    let mut hand = LinkModel::new("hand", Some(Shape::sphere(0.1)));
    hand.attached_bodies.push(AttachedBodyModel::new(
        "bottle",
        vec![Shape::cylinder(0.1, 0.5)],
        vec![],
    ));
    hand.attached_bodies.push(AttachedBodyModel::new(
        "cap",
        vec![Shape::sphere(0.2)],
        vec![],
    ));
    let model = RobotModel::new(vec![hand, LinkModel::new("wrist", Some(Shape::sphere(0.1)))]);

    let mut env = CollisionEnvironment::new();
    env.bind_robot_model(model, RobotCollisionParams::new(["hand", "wrist"]))
        .unwrap();
    env.add_self_collision_group(&names(&["hand", "wrist"]), &names(&["hand", "wrist"]));

    // Both bodies overlap each other, far away from every link.
    let mut state = RobotState::new();
    state.set_link_transform("hand", Isometry::identity());
    state.set_link_transform("wrist", Isometry::translation(0.0, -5.0, 0.0));
    state.set_attached_body_transforms("hand", 0, vec![Isometry::translation(5.0, 0.0, 0.0)]);
    state.set_attached_body_transforms("hand", 1, vec![Isometry::translation(5.0, 0.0, 0.2)]);
    env.update_robot_model(&state);
    assert!(!env.is_self_collision());

    // Once on different links, the same bodies do collide.
    let cap = env.attached_bodies_of("hand")[1].clone();
    env.clear_attached_bodies("hand").unwrap();
    let bottle = AttachedBodyModel::new("bottle", vec![Shape::cylinder(0.1, 0.5)], vec![]);
    env.attach_body("hand", bottle).unwrap();
    env.attach_body("wrist", cap).unwrap();

    state.set_link_transform("wrist", Isometry::translation(0.0, -5.0, 0.0));
    state.set_attached_body_transforms("hand", 0, vec![Isometry::translation(5.0, 0.0, 0.0)]);
    state.set_attached_body_transforms("wrist", 0, vec![Isometry::translation(5.0, 0.0, 0.2)]);
    env.update_robot_model(&state);

    let report = env.collision_contacts(&[], 0);
    assert!(report.collides);
    for contact in &report.contacts {
        assert_eq!(contact.link1_attached_body, 1);
        assert_eq!(contact.link2_attached_body, 1);
    }
}

#[test]
fn touch_links_suppress_contacts_with_the_holding_link() {
    let mut gripper = LinkModel::new("gripper", Some(Shape::sphere(0.3)));
    gripper.attached_bodies.push(AttachedBodyModel::new(
        "tool",
        vec![Shape::sphere(0.3)],
        names(&["gripper"]),
    ));
    let model = RobotModel::new(vec![gripper]);

    let mut env = CollisionEnvironment::new();
    env.bind_robot_model(model, RobotCollisionParams::new(["gripper"]))
        .unwrap();
    env.add_self_collision_group(&names(&["gripper"]), &names(&["gripper"]));
    assert!(!env.is_self_collision());

    let tool = AttachedBodyModel::new("tool", vec![Shape::sphere(0.3)], vec![]);
    env.clear_attached_bodies("gripper").unwrap();
    env.attach_body("gripper", tool).unwrap();
    assert!(env.is_self_collision());
}
