//! Shared fixtures for the editor integration tests.

#![allow(dead_code)]

use quill_scene::attribute::Attributes;
use quill_scene::serialize::{Format, Value};
use quill_scene::{
    AttributeInfo, ComponentRegistry, ComponentTypeInfo, NodeId, Scene, ScopeHint, SharedScene,
};

pub const STATIC_MODEL: &str = "StaticModel";
pub const FOLLOWER: &str = "Follower";
pub const LIGHT: &str = "Light";

pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Resizes the material list to the number of geometries of the model.
fn static_model_changed(attributes: &mut Attributes, changed: &str) {
    if changed != "Model" {
        return;
    }
    let geometries = match attributes.get("Model").and_then(Value::as_str) {
        None | Some("") => 0,
        Some(model) if model.starts_with("car") => 3,
        Some(_) => 1,
    };
    let materials = vec![Value::from("Default.xml"); geometries];
    attributes.set("Materials", Value::List(materials));
}

pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register(
        ComponentTypeInfo::new(STATIC_MODEL)
            .with_attribute(AttributeInfo::new("Model", "").with_scope(ScopeHint::EntityLocal))
            .with_attribute(AttributeInfo::new("Materials", Value::List(Vec::new())))
            .with_attribute(AttributeInfo::new("Cast Shadows", false))
            .with_hook(static_model_changed),
    );
    registry.register(
        ComponentTypeInfo::new(FOLLOWER)
            .with_attribute(AttributeInfo::new("Target", "").as_node_reference())
            .with_attribute(AttributeInfo::new("Speed", 1.0_f32)),
    );
    registry.register(
        ComponentTypeInfo::new(LIGHT)
            .with_attribute(AttributeInfo::new("Range", 10.0_f32))
            .with_attribute(AttributeInfo::new("Brightness", 1.0_f32)),
    );
    registry
}

pub fn shared_scene(format: Format) -> SharedScene {
    init_logging();
    let mut scene = Scene::with_registry("Level", registry());
    scene.set_snapshot_format(format);
    scene.into_shared()
}

pub fn node_attribute(scene: &SharedScene, name: &str) -> AttributeInfo {
    scene
        .read()
        .registry()
        .node_attribute(name)
        .cloned()
        .expect("built-in node attribute")
}

pub fn component_attribute(scene: &SharedScene, type_name: &str, name: &str) -> AttributeInfo {
    scene
        .read()
        .registry()
        .component(type_name)
        .and_then(|info| info.attribute(name))
        .cloned()
        .expect("registered component attribute")
}

pub fn create_nodes(scene: &SharedScene, parent: NodeId, count: usize) -> Vec<NodeId> {
    (0..count)
        .map(|i| {
            scene
                .write()
                .create_node(parent, &format!("Node{i}"))
                .expect("parent is alive")
        })
        .collect()
}
