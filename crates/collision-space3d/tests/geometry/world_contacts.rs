use crate::counting_narrow_phase::CountingNarrowPhase;
use collision_space3d::kinematics::{AttachedBodyModel, LinkModel, RobotModel, RobotState};
use collision_space3d::math::Isometry;
use collision_space3d::robot::RobotCollisionParams;
use collision_space3d::shapes::{Shape, StaticShape};
use collision_space3d::{AllowedContact, CollisionEnvironment};
use std::sync::atomic::Ordering;
use std::sync::Arc;

// A gripper sphere resting 5cm deep into a table.
fn gripper_over_table(env: &mut CollisionEnvironment) {
    let model = RobotModel::new(vec![
        LinkModel::new("base", Some(Shape::cuboid(0.4, 0.4, 0.2))),
        LinkModel::new("gripper", Some(Shape::sphere(0.1))),
    ]);
    env.bind_robot_model(model, RobotCollisionParams::new(["base", "gripper"]))
        .unwrap();

    let mut state = RobotState::new();
    state.set_link_transform("base", Isometry::translation(-3.0, 0.0, 0.1));
    state.set_link_transform("gripper", Isometry::translation(0.0, 0.0, 0.8));
    env.update_robot_model(&state);

    let _ = env
        .add_object(
            "table",
            Shape::cuboid(1.0, 1.0, 0.1),
            Isometry::translation(0.0, 0.0, 0.7),
        )
        .unwrap();
}

#[test]
fn table_contacts_name_the_namespace() {
    let mut env = CollisionEnvironment::new();
    gripper_over_table(&mut env);
    assert!(env.is_collision());

    let report = env.collision_contacts(&[], 0);
    assert!(report.collides);
    assert!(!report.contacts.is_empty());
    for contact in &report.contacts {
        assert_eq!(contact.object_name.as_deref(), Some("table"));
        assert_eq!(contact.link1.as_deref(), Some("gripper"));
        assert!(contact.link2.is_none());
        assert_eq!(contact.link1_attached_body, 0);
        assert_relative_eq!(contact.depth, 0.05, epsilon = 1.0e-6);
    }
}

#[test]
fn verbose_queries_report_the_same_contacts() {
    let mut env = CollisionEnvironment::new();
    gripper_over_table(&mut env);
    let quiet = env.collision_contacts(&[], 0);

    env.set_verbose(true);
    assert!(env.is_verbose());
    assert!(env.is_collision());
    assert_eq!(env.collision_contacts(&[], 0), quiet);
    assert!(env.clone().is_verbose());
}

#[test]
fn disabled_links_and_batches_are_handled() {
    let mut env = CollisionEnvironment::new();
    gripper_over_table(&mut env);
    let _ = env.set_collision_check("gripper", false);
    assert!(!env.is_collision());

    let _ = env.set_collision_check("gripper", true);
    let shapes = vec![Shape::sphere(0.3); 10];
    let poses = (0..10)
        .map(|i| Isometry::translation(-3.0 + i as f64, 5.0, 0.0))
        .collect();
    let _ = env.add_objects("shelf", shapes, poses).unwrap();

    let report = env.collision_contacts(&[], 0);
    assert!(report.contacts.iter().all(|c| c.object_name.as_deref() == Some("table")));

    env.clear_namespace("table");
    assert!(!env.is_collision());

    // The base sits on a static floor.
    let _ = env
        .add_static_object("floor", StaticShape::plane(0.0, 0.0, 1.0, 0.05))
        .unwrap();
    let report = env.collision_contacts(&[], 0);
    assert!(report.collides);
    assert!(report
        .contacts
        .iter()
        .all(|c| c.link1.as_deref() == Some("base") && c.object_name.as_deref() == Some("floor")));
}

#[test]
fn allowed_regions_hide_shallow_contacts() {
    let mut env = CollisionEnvironment::new();
    gripper_over_table(&mut env);

    let region = |links: &[&str], depth| {
        AllowedContact::new(
            Shape::cuboid(0.5, 0.5, 0.5),
            Isometry::translation(0.0, 0.0, 0.75),
            depth,
            links.iter().map(|l| l.to_string()).collect(),
        )
    };

    let report = env.collision_contacts(&[region(&["gripper"], 0.1)], 0);
    assert!(!report.collides);
    assert!(report.contacts.is_empty());

    // Too deep for the region, or not involving a listed link.
    assert!(env.collision_contacts(&[region(&["gripper"], 0.01)], 0).collides);
    assert!(env.collision_contacts(&[region(&["base"], 0.1)], 0).collides);
}

#[test]
fn allowed_collision_matrix_skips_namespaces() {
    let mut env = CollisionEnvironment::new();
    gripper_over_table(&mut env);

    let mut matrix = env.default_allowed_collision_matrix();
    assert!(matrix.set_allowed("table", "gripper", true));
    env.set_allowed_collision_matrix(matrix).unwrap();
    assert!(!env.is_collision());

    // An attached body is checked on its own.
    let cup = AttachedBodyModel::new("cup", vec![Shape::sphere(0.1)], vec!["gripper".into()]);
    env.attach_body("gripper", cup).unwrap();
    let mut state = RobotState::new();
    state.set_link_transform("gripper", Isometry::translation(0.0, 0.0, 0.8));
    state.set_attached_body_transforms("gripper", 0, vec![Isometry::translation(0.3, 0.0, 0.8)]);
    env.update_robot_model(&state);

    // Unknown to the active matrix: skipped.
    assert!(!env.is_collision());

    assert_eq!(env.allowed_collision_matrix().index_of("cup"), None);
    env.revert_allowed_collision_matrix();
    let mut matrix = env.default_allowed_collision_matrix();
    assert_eq!(matrix.allowed("cup", "gripper"), Some(true));
    assert!(matrix.set_allowed("table", "gripper", true));
    env.set_allowed_collision_matrix(matrix).unwrap();

    let report = env.collision_contacts(&[], 0);
    assert!(report.collides);
    assert!(report.contacts.iter().all(|c| c.link1_attached_body == 1));
}

#[test]
fn contact_limit_stops_the_query() {
    let (narrow_phase, calls) = CountingNarrowPhase::new(5);
    let mut env = CollisionEnvironment::with_narrow_phase(Arc::new(narrow_phase));
    env.bind_robot_model(
        RobotModel::new(vec![LinkModel::new("probe", Some(Shape::sphere(1.0)))]),
        RobotCollisionParams::new(["probe"]),
    )
    .unwrap();
    for ns in ["a", "b", "c"] {
        let _ = env
            .add_object(ns, Shape::sphere(1.0), Isometry::translation(0.5, 0.0, 0.0))
            .unwrap();
    }

    let report = env.collision_contacts(&[], 1);
    assert_eq!(report.contacts.len(), 1);
    assert!(report.terminated_early);
    assert_eq!(report.contacts[0].object_name.as_deref(), Some("a"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    calls.store(0, Ordering::SeqCst);
    let report = env.collision_contacts(&[], 0);
    assert_eq!(report.contacts.len(), 15);
    assert!(!report.terminated_early);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    calls.store(0, Ordering::SeqCst);
    let report = env.collision_contacts(&[], 7);
    assert_eq!(report.contacts.len(), 7);
    assert!(report.terminated_early);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
