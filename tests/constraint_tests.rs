use std::f64::consts::FRAC_PI_2;

use trammel::constraint::{self, set_enabled, set_tension};
use trammel::solver::{self, constraint_system, FrameInput};
use trammel::{
    Angle, AngleConstraint, AxisConstraint, ConstraintKind, EntityId, FixedConstraint, FrameObserver,
    LengthConstraint, MinLengthConstraint, NoOpFrameObserver, PhysEdge, PhysNode, Point2, Radians,
    SolverConfig, SpaceName, Vec2, World,
};

fn world() -> World {
    let mut world = World::new();
    solver::install(&mut world, SolverConfig::<f64>::new());
    world
}

fn node(world: &mut World, x: f64, y: f64) -> EntityId {
    world.create_entity().with(PhysNode::new(Point2::new(x, y))).id()
}

fn wall(world: &mut World, src: EntityId, dst: EntityId) -> EntityId {
    world
        .create_entity()
        .with(PhysEdge::<f64>::new(src, dst))
        .with(LengthConstraint::<f64>::new())
        .with(MinLengthConstraint::<f64>::new())
        .with(AxisConstraint::<f64>::new())
        .id()
}

fn pos(world: &World, e: EntityId) -> Point2<f64> {
    world.get::<PhysNode<f64>>(e).unwrap().model_pos()
}

fn length(world: &World, wall: EntityId) -> f64 {
    world.get::<PhysEdge<f64>>(wall).unwrap().edge(world).unwrap().length()
}

#[test]
fn length_converges_monotonically() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 10.0, 0.0);
    let w = wall(&mut world, a, b);
    set_enabled::<LengthConstraint<f64>>(&mut world, w, true).unwrap();
    set_tension::<LengthConstraint<f64>>(&mut world, w, 1.0).unwrap();
    world.get_mut::<LengthConstraint<f64>>(w).unwrap().set_target(12.0);

    let mut previous = f64::INFINITY;
    for frame in 0..600 {
        world.update();
        let error = (length(&world, w) - 12.0).abs();
        assert!(error <= previous + 1e-9, "error grew at frame {frame}: {previous} -> {error}");
        previous = error;
    }
    assert!(previous < 0.05, "final error {previous}");
}

#[test]
fn disabled_length_tracks_current_length() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 10.0, 0.0);
    let w = wall(&mut world, a, b);
    world.get_mut::<PhysNode<f64>>(b).unwrap().set_model_pos(Point2::new(7.0, 0.0));
    world.update();
    assert_eq!(world.get::<LengthConstraint<f64>>(w).unwrap().target(), 7.0);
}

#[test]
fn min_length_pushes_short_walls_apart() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 1.0, 0.0);
    let w = wall(&mut world, a, b);
    for _ in 0..300 {
        world.update();
    }
    assert!(length(&world, w) > 2.5, "length {}", length(&world, w));
}

#[test]
fn min_length_stands_down_for_enabled_length() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 1.0, 0.0);
    let w = wall(&mut world, a, b);
    set_enabled::<LengthConstraint<f64>>(&mut world, w, true).unwrap();
    for _ in 0..300 {
        world.update();
    }
    assert_eq!(pos(&world, a), Point2::new(0.0, 0.0));
    assert_eq!(pos(&world, b), Point2::new(1.0, 0.0));
}

#[test]
fn enabling_length_does_not_snap() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 7.5, 3.25);
    let w = wall(&mut world, a, b);
    assert!(set_enabled::<LengthConstraint<f64>>(&mut world, w, true).unwrap());
    assert!(!set_enabled::<LengthConstraint<f64>>(&mut world, w, true).unwrap());

    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert_eq!(world.get::<PhysNode<f64>>(a).unwrap().force(), Vec2::zero());
    assert_eq!(world.get::<PhysNode<f64>>(b).unwrap().force(), Vec2::zero());
}

fn corner(world: &mut World, degrees: f64) -> (EntityId, EntityId, EntityId, EntityId) {
    let center = node(world, 0.0, 0.0);
    let left_dir = Vec2::from_angle(Radians::from_degrees(degrees)).scale(10.0);
    let left = node(world, left_dir.x, left_dir.y);
    let right = node(world, 10.0, 0.0);
    let mut angle = AngleConstraint::<f64>::new(center);
    angle.left = Some(left);
    angle.right = Some(right);
    let e = world.create_entity().with(angle).id();
    (e, center, left, right)
}

fn current_angle(world: &World, e: EntityId) -> f64 {
    world.get::<AngleConstraint<f64>>(e).unwrap().current(world).unwrap().radians()
}

#[test]
fn enabling_angle_does_not_snap() {
    let mut world = world();
    let (e, _, left, right) = corner(&mut world, 73.0);
    set_enabled::<AngleConstraint<f64>>(&mut world, e, true).unwrap();
    let target = world.get::<AngleConstraint<f64>>(e).unwrap().target().radians();
    assert!((target - 73f64.to_radians()).abs() < 1e-9);

    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert_eq!(world.get::<PhysNode<f64>>(left).unwrap().force(), Vec2::zero());
    assert_eq!(world.get::<PhysNode<f64>>(right).unwrap().force(), Vec2::zero());
}

#[test]
fn angle_converges_toward_target() {
    let mut world = world();
    let (e, ..) = corner(&mut world, 80.0);
    set_enabled::<AngleConstraint<f64>>(&mut world, e, true).unwrap();
    set_tension::<AngleConstraint<f64>>(&mut world, e, 1.0).unwrap();
    world
        .get_mut::<AngleConstraint<f64>>(e)
        .unwrap()
        .set_target(Angle::of(FRAC_PI_2, SpaceName::MODEL));

    let mut previous = f64::INFINITY;
    for _ in 0..600 {
        world.update();
        let error = (current_angle(&world, e) - FRAC_PI_2).abs();
        assert!(error <= previous + 1e-9);
        previous = error;
    }
    assert!(previous.to_degrees() < 0.5, "final error {} degrees", previous.to_degrees());
}

#[test]
fn angle_without_neighbours_is_a_no_op() {
    let mut world = world();
    let center = node(&mut world, 0.0, 0.0);
    let e = world.create_entity().with(AngleConstraint::<f64>::new(center)).id();
    set_enabled::<AngleConstraint<f64>>(&mut world, e, true).unwrap();
    assert_eq!(current_angle(&world, e), 0.0);
    for _ in 0..10 {
        world.update();
    }
    assert_eq!(pos(&world, center), Point2::origin());
}

#[test]
fn incomplete_corner_keeps_its_target() {
    let mut world = world();
    let center = node(&mut world, 0.0, 0.0);
    let e = world.create_entity().with(AngleConstraint::<f64>::new(center)).id();
    set_enabled::<AngleConstraint<f64>>(&mut world, e, true).unwrap();
    assert_eq!(world.get::<AngleConstraint<f64>>(e).unwrap().target().radians(), FRAC_PI_2);

    // Arms attached afterwards already sit at the kept right angle.
    let left = node(&mut world, 0.0, 10.0);
    let right = node(&mut world, 10.0, 0.0);
    {
        let angle = world.get_mut::<AngleConstraint<f64>>(e).unwrap();
        angle.left = Some(left);
        angle.right = Some(right);
    }
    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert_eq!(world.get::<PhysNode<f64>>(left).unwrap().force(), Vec2::zero());

    set_enabled::<AngleConstraint<f64>>(&mut world, e, false).unwrap();
    world.get_mut::<AngleConstraint<f64>>(e).unwrap().left = None;
    world
        .get_mut::<AngleConstraint<f64>>(e)
        .unwrap()
        .set_target(Angle::of(1.0, SpaceName::MODEL));
    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert_eq!(world.get::<AngleConstraint<f64>>(e).unwrap().target().radians(), 1.0);
}

#[test]
fn axis_straightens_a_tilted_wall() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 10.0, 1.0);
    let w = wall(&mut world, a, b);
    set_enabled::<AxisConstraint<f64>>(&mut world, w, true).unwrap();
    set_tension::<AxisConstraint<f64>>(&mut world, w, 1.0).unwrap();
    assert!(!world.get::<AxisConstraint<f64>>(w).unwrap().is_vertical(&Default::default()));

    let mut previous = f64::INFINITY;
    for _ in 0..600 {
        world.update();
        let dy = (pos(&world, b).y - pos(&world, a).y).abs();
        assert!(dy <= previous + 1e-9);
        previous = dy;
    }
    assert!(previous < 0.15, "still tilted by {previous}");
}

#[test]
fn axis_enable_picks_the_closer_screen_axis() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 1.0, 10.0);
    let w = wall(&mut world, a, b);
    set_enabled::<AxisConstraint<f64>>(&mut world, w, true).unwrap();
    let axis = world.get::<AxisConstraint<f64>>(w).unwrap();
    assert!(axis.is_vertical(&Default::default()));
}

#[test]
fn higher_priority_writes_last() {
    #[derive(Default)]
    struct Order(Vec<(ConstraintKind, i32)>);
    impl FrameObserver for Order {
        fn on_constraint_applied(&mut self, kind: ConstraintKind, _entity: EntityId, priority: i32) {
            self.0.push((kind, priority));
        }
    }

    let mut world = world();
    let n = node(&mut world, 0.0, 0.0);
    let mut high = FixedConstraint::<f64>::new(vec![n]);
    high.state.priority = 2;
    let mut low = FixedConstraint::<f64>::new(vec![n]);
    low.state.priority = 1;
    // Registered first, but must still be enforced last.
    let high = world.create_entity().with(high).id();
    let low = world.create_entity().with(low).id();
    set_enabled::<FixedConstraint<f64>>(&mut world, high, true).unwrap();
    set_enabled::<FixedConstraint<f64>>(&mut world, low, true).unwrap();
    world.get_mut::<FixedConstraint<f64>>(high).unwrap().update_targets(vec![Point2::new(4.0, 0.0)]);
    world.get_mut::<FixedConstraint<f64>>(low).unwrap().update_targets(vec![Point2::new(-4.0, 0.0)]);

    let mut order = Order::default();
    constraint_system::<f64>(&mut world, &mut order);
    assert_eq!(pos(&world, n), Point2::new(4.0, 0.0));
    assert_eq!(order.0, vec![(ConstraintKind::Fixed, 1), (ConstraintKind::Fixed, 2)]);
}

#[test]
fn priority_orders_force_constraints_on_a_shared_node() {
    #[derive(Default)]
    struct Order(Vec<(EntityId, i32)>);
    impl FrameObserver for Order {
        fn on_constraint_applied(&mut self, _kind: ConstraintKind, entity: EntityId, priority: i32) {
            self.0.push((entity, priority));
        }
    }

    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 10.0, 0.0);
    let lengthen = |world: &mut World, target: f64, priority: i32| {
        let w = world
            .create_entity()
            .with(PhysEdge::<f64>::new(a, b))
            .with(LengthConstraint::<f64>::new())
            .id();
        set_enabled::<LengthConstraint<f64>>(world, w, true).unwrap();
        set_tension::<LengthConstraint<f64>>(world, w, 1.0).unwrap();
        let length = world.get_mut::<LengthConstraint<f64>>(w).unwrap();
        length.set_target(target);
        length.state.priority = priority;
        w
    };
    // Registered first, enforced second.
    let stretch = lengthen(&mut world, 12.0, 2);
    let shrink = lengthen(&mut world, 9.0, 1);

    let mut order = Order::default();
    constraint_system::<f64>(&mut world, &mut order);
    assert_eq!(order.0, vec![(shrink, 1), (stretch, 2)]);

    // k = 3: +2 * 3/2 from the stretch, -1 * 3/2 from the shrink.
    let force = world.get::<PhysNode<f64>>(b).unwrap().force();
    assert!((force.x - 1.5).abs() < 1e-12 && force.y.abs() < 1e-12, "force {force:?}");
    let force = world.get::<PhysNode<f64>>(a).unwrap().force();
    assert!((force.x + 1.5).abs() < 1e-12, "force {force:?}");
}

#[test]
fn soft_constraints_pause_while_dragging() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 10.0, 0.0);
    let w = wall(&mut world, a, b);
    set_enabled::<LengthConstraint<f64>>(&mut world, w, true).unwrap();
    world.get_mut::<LengthConstraint<f64>>(w).unwrap().set_target(12.0);
    world.resource_mut::<FrameInput<f64>>().unwrap().dragging = true;

    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert_eq!(world.get::<PhysNode<f64>>(b).unwrap().force(), Vec2::zero());

    constraint::set_tension::<LengthConstraint<f64>>(&mut world, w, 1.0).unwrap();
    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert!(world.get::<PhysNode<f64>>(b).unwrap().force().x > 0.0);
}

#[test]
fn missing_component_is_reported() {
    let mut world = world();
    let n = node(&mut world, 0.0, 0.0);
    let err = set_enabled::<LengthConstraint<f64>>(&mut world, n, true).unwrap_err();
    assert_eq!(err.to_string(), format!("entity {n} has no LengthConstraint component"));
}

#[test]
fn untrackable_constraint_keeps_its_target() {
    let mut world = world();
    let a = node(&mut world, 0.0, 0.0);
    let b = node(&mut world, 10.0, 0.0);
    let w = wall(&mut world, a, b);
    world.get_mut::<LengthConstraint<f64>>(w).unwrap().set_target(7.0);
    world.delete_entity(b).unwrap();

    constraint_system::<f64>(&mut world, &mut NoOpFrameObserver);
    assert_eq!(world.get::<LengthConstraint<f64>>(w).unwrap().target(), 7.0);
}
