use pretty_assertions::assert_eq;
use trammel::{
    Angle, AngleConstraint, ConstraintStatus, Distance, FixedConstraint, FloorPlan, LengthConstraint, PhysEdge,
    PlanError, Point2, Position, SpaceName, Viewport, Wall,
};

fn plan() -> FloorPlan<f64> {
    FloorPlan::new(Viewport::new(800.0, 600.0).with_radius(50.0)).unwrap()
}

fn model(x: f64, y: f64) -> Position<f64> {
    Position::of(Point2::new(x, y), SpaceName::MODEL)
}

fn square(plan: &mut FloorPlan<f64>) -> trammel::Room {
    // Clockwise, so every interior angle measures 90 degrees.
    plan.add_room(&[model(0.0, 0.0), model(0.0, 10.0), model(10.0, 10.0), model(10.0, 0.0)])
        .unwrap()
}

#[test]
fn room_links_joints_and_walls() {
    let mut plan = plan();
    let room = square(&mut plan);
    assert_eq!(room.joints.len(), 4);
    assert_eq!(room.walls.len(), 4);
    assert_eq!(plan.walls(), room.walls);
    assert_eq!(plan.joints(), room.joints);

    for (i, &joint) in room.joints.iter().enumerate() {
        let j = plan.joint(joint).unwrap();
        assert_eq!(j.outgoing, Some(room.walls[i]));
        assert_eq!(j.incoming, Some(room.walls[(i + 3) % 4]));
    }

    let corner = plan.world().get::<AngleConstraint<f64>>(room.joints[1]).unwrap();
    assert_eq!(corner.left, Some(room.joints[2]));
    assert_eq!(corner.right, Some(room.joints[0]));
    assert_eq!(plan.corner_angle_label(room.joints[1]).unwrap(), "90°");
}

#[test]
fn room_needs_three_corners() {
    let mut plan = plan();
    let err = plan.add_room(&[model(0.0, 0.0), model(1.0, 0.0)]).unwrap_err();
    assert_eq!(err, PlanError::InsufficientCorners(2));
}

#[test]
fn wall_cannot_loop_back() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    assert_eq!(plan.add_wall(a, a), Err(PlanError::SelfLoop(a)));
}

#[test]
fn deleting_a_wall_removes_orphaned_joints() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(10.0, 0.0)).unwrap();
    let c = plan.add_joint(&model(10.0, 10.0)).unwrap();
    let ab = plan.add_wall(a, b).unwrap();
    let bc = plan.add_wall(b, c).unwrap();

    plan.delete_wall(ab).unwrap();
    assert!(!plan.world().is_alive(ab));
    assert!(!plan.world().is_alive(a));
    assert_eq!(plan.joint(b).unwrap().incoming, None);
    assert_eq!(plan.joint(b).unwrap().outgoing, Some(bc));
    assert_eq!(plan.world().get::<AngleConstraint<f64>>(b).unwrap().right, None);

    plan.delete_wall(bc).unwrap();
    assert!(plan.joints().is_empty());
    assert!(plan.walls().is_empty());
    assert_eq!(plan.delete_wall(bc), Err(PlanError::UnknownEntity(bc)));
}

#[test]
fn occupied_joint_sides_are_rejected() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(10.0, 0.0)).unwrap();
    let c = plan.add_joint(&model(10.0, 10.0)).unwrap();
    let ab = plan.add_wall(a, b).unwrap();

    assert_eq!(plan.add_wall(a, c), Err(PlanError::JointOccupied { joint: a, wall: ab }));
    assert_eq!(plan.add_wall(c, b), Err(PlanError::JointOccupied { joint: b, wall: ab }));
    assert_eq!(plan.walls(), vec![ab]);
    assert_eq!(plan.joint(a).unwrap().outgoing, Some(ab));

    let bc = plan.add_wall(b, c).unwrap();
    plan.delete_wall(bc).unwrap();
    assert!(plan.world().is_alive(a));
    assert!(plan.world().is_alive(b));
    assert!(!plan.world().is_alive(c));
    assert_eq!(plan.wall_edge(ab).unwrap().length(), 10.0);
    for _ in 0..10 {
        plan.tick(1.0 / 60.0);
    }
    assert_eq!(plan.wall_length_label(ab).unwrap(), "10.00");
}

#[test]
fn joints_still_used_by_a_wall_survive_deletion() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(10.0, 0.0)).unwrap();
    let c = plan.add_joint(&model(0.0, 10.0)).unwrap();
    let ab = plan.add_wall(a, b).unwrap();
    // A wall wired straight into the world, which the joints do not record.
    let ca = plan
        .world_mut()
        .create_entity()
        .with(Wall { src: c, dst: a })
        .with(PhysEdge::<f64>::new(c, a))
        .id();

    plan.delete_wall(ab).unwrap();
    assert!(plan.world().is_alive(a));
    assert!(!plan.world().is_alive(b));
    assert_eq!(plan.wall_edge(ca).unwrap().length(), 10.0);
}

#[test]
fn dragging_a_locked_joint_moves_the_lock() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(10.0, 0.0)).unwrap();
    plan.add_wall(a, b).unwrap();
    assert!(plan.set_position_locked(a, true).unwrap());

    plan.set_dragging(true);
    plan.drag_joint(a, &model(-5.0, 5.0)).unwrap();
    plan.tick(1.0 / 60.0);
    plan.set_dragging(false);

    let fixed = plan.world().get::<FixedConstraint<f64>>(a).unwrap();
    assert_eq!(fixed.targets(), &[Point2::new(-5.0, 5.0)]);
    for _ in 0..30 {
        plan.tick(1.0 / 60.0);
    }
    let p = plan.joint_position(a).unwrap().raw();
    assert!((p.x + 5.0).abs() < 1e-9 && (p.y - 5.0).abs() < 1e-9, "joint at {p:?}");
}

#[test]
fn drag_accepts_screen_positions() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    // Canvas center is the model origin; 300 px per 50 units.
    plan.drag_joint(a, &Position::of(Point2::new(460.0, 240.0), SpaceName::SCREEN)).unwrap();
    let p = plan.joint_position(a).unwrap().raw();
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.y - 10.0).abs() < 1e-9);
}

#[test]
fn length_labels_follow_the_lock() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(10.0, 0.0)).unwrap();
    let wall = plan.add_wall(a, b).unwrap();
    assert_eq!(plan.wall_length_label(wall).unwrap(), "10.00");
    assert_eq!(plan.wall_length_status(wall).unwrap(), None);

    plan.set_length_locked(wall, true).unwrap();
    plan.set_target_length(wall, &Distance::of(12.0, SpaceName::MODEL)).unwrap();
    assert_eq!(plan.wall_length_label(wall).unwrap(), "10.00 (-2.00)");
    assert_eq!(plan.wall_length_status(wall).unwrap(), Some(ConstraintStatus::Under(2.0)));

    plan.set_tension::<LengthConstraint<f64>>(wall, 1.0).unwrap();
    for _ in 0..600 {
        plan.tick(1.0 / 60.0);
    }
    let length = plan.wall_edge(wall).unwrap().length();
    assert!((length - 12.0).abs() < 0.05, "length {length}");
}

#[test]
fn angle_lock_holds_a_corner() {
    let mut plan = plan();
    let room = square(&mut plan);
    let corner = room.joints[1];
    plan.set_angle_locked(corner, true).unwrap();
    plan.set_target_angle(corner, Angle::of(100f64.to_radians(), SpaceName::MODEL)).unwrap();
    assert_eq!(plan.corner_angle_label(corner).unwrap(), "90° (-10°)");
}

#[test]
fn tension_out_of_range_is_rejected() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(10.0, 0.0)).unwrap();
    let wall = plan.add_wall(a, b).unwrap();
    assert_eq!(
        plan.set_tension::<LengthConstraint<f64>>(wall, 1.5),
        Err(PlanError::InvalidTension(1.5))
    );
}

#[test]
fn paused_plans_do_not_move() {
    let mut plan = plan();
    let a = plan.add_joint(&model(0.0, 0.0)).unwrap();
    let b = plan.add_joint(&model(1.0, 0.0)).unwrap();
    plan.add_wall(a, b).unwrap();
    plan.set_kinematics_enabled(false);
    for _ in 0..60 {
        plan.tick(1.0 / 60.0);
    }
    assert_eq!(plan.joint_position(b).unwrap().raw(), Point2::new(1.0, 0.0));
}
