use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ember_core::math::Vec2;
use ember_entity::PropertyManager;

fn populated() -> PropertyManager {
    let mut props = PropertyManager::new();
    props.add("vPosition", Vec2::ZERO);
    props.add("vVelocity", Vec2::new(1.0, 0.5));
    props.add("fRotation", 0.0f32);
    props.add("bVisible", true);
    for i in 0..16 {
        props.add(&format!("uExtra{i}"), i as u32);
    }
    props
}

fn property_get(c: &mut Criterion) {
    let props = populated();
    c.bench_function("property_get", |b| {
        b.iter(|| black_box(props.get::<Vec2>(black_box("vVelocity"))))
    });
}

fn property_set(c: &mut Criterion) {
    let mut props = populated();
    c.bench_function("property_set", |b| {
        b.iter(|| props.set(black_box("vPosition"), Vec2::new(1.0, 1.0)))
    });
}

fn property_clone(c: &mut Criterion) {
    let props = populated();
    c.bench_function("property_clone", |b| b.iter(|| black_box(props.clone())));
}

criterion_group!(benches, property_get, property_set, property_clone);
criterion_main!(benches);
