//! Benchmarks for trammel floor-plan relaxation.

use criterion::{criterion_group, criterion_main, Criterion};
use trammel::*;

fn ring(plan: &mut FloorPlan<f64>, corners: usize, radius: f64) -> Room {
    let positions: Vec<_> = (0..corners)
        .map(|i| {
            let dir = Vec2::from_angle(Radians(i as f64 * core::f64::consts::TAU / corners as f64));
            Position::of(dir.scale(radius).to_point(), SpaceName::MODEL)
        })
        .collect();
    plan.add_room(&positions).unwrap()
}

fn bench_locked_room(c: &mut Criterion) {
    c.bench_function("room_8_corners_all_locked_60_frames", |b| {
        b.iter(|| {
            let mut plan = FloorPlan::<f64>::new(Viewport::new(1024.0, 768.0)).unwrap();
            let room = ring(&mut plan, 8, 20.0);
            for &wall in &room.walls {
                plan.set_length_locked(wall, true).unwrap();
            }
            for &joint in &room.joints {
                plan.set_angle_locked(joint, true).unwrap();
            }
            for _ in 0..60 {
                plan.tick(1.0 / 60.0);
            }
            plan.joint_position(room.joints[0]).unwrap()
        });
    });
}

fn bench_many_rooms(c: &mut Criterion) {
    c.bench_function("20_rooms_min_length_60_frames", |b| {
        b.iter(|| {
            let mut plan = FloorPlan::<f64>::new(Viewport::new(1024.0, 768.0)).unwrap();
            for _ in 0..20 {
                ring(&mut plan, 4, 1.0);
            }
            for _ in 0..60 {
                plan.tick(1.0 / 60.0);
            }
            plan.walls().len()
        });
    });
}

fn bench_space_conversion(c: &mut Criterion) {
    let mut spaces = SpaceRegistry::new();
    Viewport::new(1920.0, 1080.0).with_radius(35.0).install(&mut spaces).unwrap();
    c.bench_function("position_model_to_screen_1000", |b| {
        b.iter(|| {
            let mut acc = Point2::origin();
            for i in 0..1000 {
                let p = Position::of(Point2::new(i as f64, -(i as f64)), SpaceName::MODEL);
                acc = acc + p.get(&spaces, SpaceName::SCREEN).to_vec();
            }
            acc
        });
    });
}

criterion_group!(benches, bench_locked_room, bench_many_rooms, bench_space_conversion);
criterion_main!(benches);
