use criterion::{Criterion, black_box, criterion_group, criterion_main};

use quill_scene::serialize::{EntitySnapshot, Format, SceneSnapshot};
use quill_scene::{AttributeInfo, ComponentRegistry, ComponentTypeInfo, NodeId, Scene};

/// A scene with `width` top-level nodes, each holding `depth` nested
/// children with one light component apiece.
fn build_scene(width: usize, depth: usize, format: Format) -> (Scene, NodeId) {
    let mut registry = ComponentRegistry::new();
    registry.register(
        ComponentTypeInfo::new("Light")
            .with_attribute(AttributeInfo::new("Range", 10.0_f32))
            .with_attribute(AttributeInfo::new("Color", [1.0_f32, 1.0, 1.0])),
    );
    let mut scene = Scene::with_registry("Bench", registry);
    scene.set_snapshot_format(format);
    let root = scene.root();
    let mut first = root;
    for i in 0..width {
        let mut parent = scene.create_node(root, &format!("Node{i}")).unwrap();
        if i == 0 {
            first = parent;
        }
        for d in 0..depth {
            let child = scene.create_node(parent, &format!("Node{i}_{d}")).unwrap();
            scene.create_component(child, "Light").unwrap();
            parent = child;
        }
    }
    (scene, first)
}

// ---------------------------------------------------------------------------
// Entity snapshots
// ---------------------------------------------------------------------------

fn bench_capture_subtree(c: &mut Criterion) {
    let (scene, node) = build_scene(1, 64, Format::Bincode);
    c.bench_function("capture_node_subtree_64", |b| {
        b.iter(|| EntitySnapshot::capture_node(black_box(&scene), black_box(node)).unwrap());
    });
}

fn bench_restore_subtree(c: &mut Criterion) {
    let (mut scene, node) = build_scene(1, 64, Format::Bincode);
    let snapshot = EntitySnapshot::capture_node(&scene, node).unwrap();
    c.bench_function("restore_node_subtree_64", |b| {
        b.iter(|| snapshot.restore(black_box(&mut scene)).unwrap());
    });
}

// ---------------------------------------------------------------------------
// Scene snapshots
// ---------------------------------------------------------------------------

fn bench_capture_scene_bincode(c: &mut Criterion) {
    let (scene, _) = build_scene(100, 10, Format::Bincode);
    c.bench_function("capture_scene_1000_bincode", |b| {
        b.iter(|| SceneSnapshot::capture(black_box(&scene)).unwrap());
    });
}

fn bench_capture_scene_ron(c: &mut Criterion) {
    let (scene, _) = build_scene(100, 10, Format::Ron);
    c.bench_function("capture_scene_1000_ron", |b| {
        b.iter(|| SceneSnapshot::capture(black_box(&scene)).unwrap());
    });
}

fn bench_restore_scene(c: &mut Criterion) {
    let (mut scene, _) = build_scene(100, 10, Format::Bincode);
    let snapshot = SceneSnapshot::capture(&scene).unwrap();
    c.bench_function("restore_scene_1000_bincode", |b| {
        b.iter(|| snapshot.restore(black_box(&mut scene)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_capture_subtree,
    bench_restore_subtree,
    bench_capture_scene_bincode,
    bench_capture_scene_ron,
    bench_restore_scene,
);
criterion_main!(benches);
