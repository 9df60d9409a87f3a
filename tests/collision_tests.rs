use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rebound_core::{
    config::DEFAULT_PAD, CollisionConfig, CollisionWorld, ObjectId, PhysicsObject, Vec3,
};

fn cube(id: u32, from: Vec3, to: Vec3) -> PhysicsObject {
    PhysicsObject::builder(ObjectId(id))
        .cuboid(Vec3::splat(1.0))
        .previous_position(from)
        .position(to)
        .build()
}

#[test]
fn moving_box_stops_pad_away_from_resting_box() {
    let mut objects = vec![
        cube(0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        cube(1, Vec3::new(4.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)),
    ];
    let mut world = CollisionWorld::new();
    let resolution = world.step(&mut objects).expect("unique ids");

    let rebound = resolution.rebound(ObjectId(0), ObjectId(1)).expect("pair recorded");
    assert_eq!(rebound.fraction_a, 0.0);
    assert!(rebound.fraction_b > 0.0 && rebound.fraction_b <= 1.0);
    assert_eq!(resolution.collides_with.get(ObjectId(0)), &[ObjectId(1)]);
    assert_eq!(resolution.collides_with.get(ObjectId(1)), &[ObjectId(0)]);

    assert_eq!(objects[0].position(), Vec3::new(1.0, 0.0, 0.0));
    assert_abs_diff_eq!(
        objects[1].world_aabb().min.x - objects[0].world_aabb().max.x,
        DEFAULT_PAD,
        epsilon = 1e-5
    );
}

#[test]
fn chain_of_movers_converges_without_overlap() {
    let mut objects = vec![
        cube(0, Vec3::ZERO, Vec3::ZERO),
        cube(1, Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0)),
        cube(2, Vec3::new(6.0, 0.0, 0.0), Vec3::new(3.2, 0.0, 0.0)),
    ];
    let mut world = CollisionWorld::new();
    let resolution = world.step(&mut objects).unwrap();

    assert!(resolution.converged);
    assert_eq!(resolution.iterations, 3);
    for i in 0..objects.len() {
        for j in i + 1..objects.len() {
            assert!(!objects[i].world_aabb().overlaps(&objects[j].world_aabb()));
        }
    }
    let (a, b, c) = (&objects[0], &objects[1], &objects[2]);
    assert_abs_diff_eq!(b.world_aabb().min.x - a.world_aabb().max.x, DEFAULT_PAD, epsilon = 1e-4);
    assert_abs_diff_eq!(c.world_aabb().min.x - b.world_aabb().max.x, DEFAULT_PAD, epsilon = 1e-4);

    // The last box was pushed in two passes; its fraction compounds.
    let rebound = resolution.rebound(ObjectId(1), ObjectId(2)).unwrap();
    assert!(rebound.fraction_b > 0.2 && rebound.fraction_b < 1.0);
}

#[test]
fn iteration_cap_reports_not_converged() {
    let mut objects = vec![
        cube(0, Vec3::ZERO, Vec3::ZERO),
        cube(1, Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.5, 0.0, 0.0)),
        cube(2, Vec3::new(6.0, 0.0, 0.0), Vec3::new(3.2, 0.0, 0.0)),
    ];
    let config = CollisionConfig::default().with_max_resolve_iterations(1);
    let mut world = CollisionWorld::with_config(config).unwrap();
    let resolution = world.step(&mut objects).unwrap();

    assert!(!resolution.converged);
    assert_eq!(resolution.iterations, 1);
    assert!(!world.profile().converged);
}

#[test]
fn sensors_never_move_anything() {
    let mut objects = vec![
        PhysicsObject::builder(ObjectId(0))
            .cuboid(Vec3::splat(1.0))
            .sensor()
            .build(),
        cube(1, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)),
    ];
    let mut world = CollisionWorld::new();
    let resolution = world.step(&mut objects).unwrap();

    assert!(resolution.collides_with.contains(ObjectId(0), ObjectId(1)));
    assert!(resolution.rebound(ObjectId(0), ObjectId(1)).unwrap().is_zero());
    assert_eq!(objects[0].position(), Vec3::ZERO);
    assert_eq!(objects[1].position(), Vec3::new(0.5, 0.0, 0.0));
    assert!(world.contacts().is_touching(ObjectId(0), ObjectId(1)));
}

#[test]
fn sensor_pairs_can_be_left_out_of_collides_with() {
    let mut objects = vec![
        PhysicsObject::builder(ObjectId(0))
            .cuboid(Vec3::splat(1.0))
            .sensor()
            .build(),
        cube(1, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0)),
    ];
    let config = CollisionConfig::default().with_sensor_reporting(false);
    let mut world = CollisionWorld::with_config(config).unwrap();
    let resolution = world.step(&mut objects).unwrap();

    assert!(resolution.collides_with.is_empty());
    assert!(world.contacts().is_touching(ObjectId(0), ObjectId(1)));
}

#[test]
fn contact_persists_while_resting_and_drops_when_apart() {
    let mut objects = vec![
        cube(0, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        cube(1, Vec3::new(4.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)),
    ];
    let mut world = CollisionWorld::new();
    world.step(&mut objects).unwrap();
    assert!(world.contacts().is_touching(ObjectId(0), ObjectId(1)));

    world.step(&mut objects).unwrap();
    assert!(world.contacts().is_touching(ObjectId(0), ObjectId(1)));

    objects[1].translate(Vec3::new(1.0, 0.0, 0.0));
    world.step(&mut objects).unwrap();
    assert!(world.contacts().is_empty());
}

#[test]
fn teleported_overlap_is_recorded_but_not_pushed() {
    let mut objects = vec![cube(0, Vec3::ZERO, Vec3::ZERO), cube(1, Vec3::new(8.0, 0.0, 0.0), Vec3::new(8.0, 0.0, 0.0))];
    objects[1].teleport(Vec3::new(1.0, 0.0, 0.0));

    let mut world = CollisionWorld::new();
    let resolution = world.step(&mut objects).unwrap();
    assert!(resolution.collides_with.contains(ObjectId(0), ObjectId(1)));
    assert!(resolution.converged);
    assert_eq!(objects[1].position(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn slice_order_does_not_change_the_outcome() {
    let build = || {
        vec![
            cube(0, Vec3::ZERO, Vec3::ZERO),
            cube(1, Vec3::new(3.0, 0.4, 0.0), Vec3::new(1.5, 0.2, 0.0)),
            cube(2, Vec3::new(0.3, 3.5, 0.1), Vec3::new(0.2, 1.6, 0.1)),
            cube(3, Vec3::new(-3.0, -0.5, 0.2), Vec3::new(-1.2, -0.3, 0.2)),
        ]
    };
    let mut forward = build();
    let mut reversed = build();
    reversed.reverse();

    let mut world = CollisionWorld::new();
    let first = world.step(&mut forward).unwrap().clone();
    let mut world = CollisionWorld::new();
    let second = world.step(&mut reversed).unwrap().clone();

    assert_eq!(first.collides_with, second.collides_with);
    assert_eq!(first.rebounds, second.rebounds);
    for object in &forward {
        let twin = reversed.iter().find(|o| o.id() == object.id()).unwrap();
        assert_eq!(object.position(), twin.position());
    }
}

fn offset() -> impl Strategy<Value = f32> {
    prop_oneof![-2.5f32..-0.25, 0.25f32..2.5]
}

proptest! {
    #[test]
    fn swapping_ids_mirrors_the_result(
        (ox, oy, oz) in (offset(), offset(), offset()),
        (ax, ay, az) in (-1.5f32..1.5, -1.5f32..1.5, -1.5f32..1.5),
        (bx, by, bz) in (-1.5f32..1.5, -1.5f32..1.5, -1.5f32..1.5),
    ) {
        let start_a = Vec3::ZERO;
        let start_b = Vec3::new(ox, oy, oz) * 1.6;
        let end_a = start_a + Vec3::new(ax, ay, az);
        let end_b = start_b + Vec3::new(bx, by, bz);

        let mut straight = vec![cube(0, start_a, end_a), cube(1, start_b, end_b)];
        let mut swapped = vec![cube(1, start_a, end_a), cube(0, start_b, end_b)];

        let mut world = CollisionWorld::new();
        let first = world.step(&mut straight).unwrap().clone();
        let mut world = CollisionWorld::new();
        let second = world.step(&mut swapped).unwrap().clone();

        prop_assert_eq!(straight[0].position(), swapped[0].position());
        prop_assert_eq!(straight[1].position(), swapped[1].position());
        prop_assert_eq!(
            first.collides_with.contains(ObjectId(0), ObjectId(1)),
            second.collides_with.contains(ObjectId(0), ObjectId(1))
        );
        prop_assert_eq!(
            first.collides_with.contains(ObjectId(0), ObjectId(1)),
            first.collides_with.contains(ObjectId(1), ObjectId(0))
        );

        if let (Some(r1), Some(r2)) = (
            first.rebound(ObjectId(0), ObjectId(1)),
            second.rebound(ObjectId(0), ObjectId(1)),
        ) {
            prop_assert_eq!(r1.fraction_a, r2.fraction_b);
            prop_assert_eq!(r1.fraction_b, r2.fraction_a);
            prop_assert!((0.0..=1.0).contains(&r1.fraction_a));
            prop_assert!((0.0..=1.0).contains(&r1.fraction_b));
        }
    }
}
