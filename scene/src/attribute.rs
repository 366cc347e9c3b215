//! Runtime reflection for node and component attributes.
//!
//! Every node carries the built-in node attributes ([`NAME`], [`ENABLED`],
//! [`POSITION`], [`TAGS`]); every component carries the attributes declared
//! by its registered [`ComponentTypeInfo`]. Each attribute declares a
//! [`ScopeHint`] describing how much surrounding state changes when the
//! attribute changes.

use serde::{Deserialize, Serialize};

use crate::serialize::Value;

/// Name attribute of every node. Node names are looked up by other entities.
pub const NAME: &str = "Name";
/// Enabled flag of every node.
pub const ENABLED: &str = "Enabled";
/// Local position of every node.
pub const POSITION: &str = "Position";
/// Free-form tag list of every node.
pub const TAGS: &str = "Tags";

/// Declared granularity of the state affected by an attribute change.
///
/// Ordered from narrowest to widest; escalation only ever goes up
/// (`a.max(b)`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeHint {
    /// The attribute value fully describes the change.
    #[default]
    AttributeOnly,
    /// The change also rewrites other state of the owning entity.
    EntityLocal,
    /// The change is visible through cross-references elsewhere in the scene.
    SceneWide,
}

/// Descriptor of one reflected attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    name: String,
    default: Value,
    scope_hint: ScopeHint,
    node_reference: bool,
}

impl AttributeInfo {
    /// Creates an [`AttributeOnly`](ScopeHint::AttributeOnly) attribute.
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            scope_hint: ScopeHint::AttributeOnly,
            node_reference: false,
        }
    }

    /// Set the declared scope hint.
    #[must_use]
    pub fn with_scope(mut self, scope_hint: ScopeHint) -> Self {
        self.scope_hint = scope_hint;
        self
    }

    /// Marks the attribute as holding the name of another node.
    ///
    /// Reference attributes are rewritten by [`Scene::rename_node`](crate::Scene::rename_node)
    /// and can be resolved with [`Scene::resolve_reference`](crate::Scene::resolve_reference).
    /// They are scene-wide by nature.
    #[must_use]
    pub fn as_node_reference(mut self) -> Self {
        self.node_reference = true;
        self.scope_hint = ScopeHint::SceneWide;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn scope_hint(&self) -> ScopeHint {
        self.scope_hint
    }

    pub fn is_node_reference(&self) -> bool {
        self.node_reference
    }
}

/// Ordered attribute storage of one node or component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<(String, Value)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds storage holding every declared attribute at its default value.
    pub fn from_defaults<'a>(infos: impl IntoIterator<Item = &'a AttributeInfo>) -> Self {
        Self(
            infos
                .into_iter()
                .map(|info| (info.name.clone(), info.default.clone()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Sets `name`, appending it if missing. Returns the previous value.
    pub fn set(&mut self, name: &str, value: Value) -> Option<Value> {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((name.to_owned(), value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Called after an attribute of a component changed through
/// [`Scene::set_component_attribute`](crate::Scene::set_component_attribute),
/// with the component's attributes and the changed attribute's name.
///
/// Hooks keep derived attributes consistent (e.g. resizing a material list
/// when the model changes). Restoring from snapshots never runs hooks.
pub type AttributeHook = fn(&mut Attributes, &str);

/// Reflection data of a component type.
#[derive(Debug, Clone)]
pub struct ComponentTypeInfo {
    name: String,
    attributes: Vec<AttributeInfo>,
    hook: Option<AttributeHook>,
}

impl ComponentTypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            hook: None,
        }
    }

    /// Adds an attribute declaration.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeInfo) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets the attribute-change hook.
    #[must_use]
    pub fn with_hook(mut self, hook: AttributeHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn hook(&self) -> Option<AttributeHook> {
        self.hook
    }

    /// The widest scope hint among the type's attributes.
    ///
    /// Creating or removing a component of this type disturbs state of at
    /// most this granularity.
    pub fn scope_hint(&self) -> ScopeHint {
        self.attributes
            .iter()
            .map(AttributeInfo::scope_hint)
            .max()
            .unwrap_or_default()
    }
}

/// Registry of node attributes and component types known to a scene.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    node_attributes: Vec<AttributeInfo>,
    components: Vec<ComponentTypeInfo>,
}

impl ComponentRegistry {
    /// Creates a registry with the built-in node attributes and no components.
    pub fn new() -> Self {
        Self {
            node_attributes: vec![
                AttributeInfo::new(NAME, "").with_scope(ScopeHint::SceneWide),
                AttributeInfo::new(ENABLED, true),
                AttributeInfo::new(POSITION, [0.0_f32; 3]),
                AttributeInfo::new(TAGS, Value::List(Vec::new())),
            ],
            components: Vec::new(),
        }
    }

    /// Registers a component type, replacing any previous type of that name.
    pub fn register(&mut self, info: ComponentTypeInfo) {
        if let Some(existing) = self.components.iter_mut().find(|c| c.name == info.name) {
            log::debug!("Re-registering component type '{}'", info.name);
            *existing = info;
        } else {
            self.components.push(info);
        }
    }

    pub fn component(&self, name: &str) -> Option<&ComponentTypeInfo> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentTypeInfo> + '_ {
        self.components.iter()
    }

    pub fn node_attributes(&self) -> &[AttributeInfo] {
        &self.node_attributes
    }

    pub fn node_attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.node_attributes.iter().find(|a| a.name == name)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_hints_are_ordered() {
        assert!(ScopeHint::AttributeOnly < ScopeHint::EntityLocal);
        assert!(ScopeHint::EntityLocal < ScopeHint::SceneWide);
        assert_eq!(
            ScopeHint::EntityLocal.max(ScopeHint::AttributeOnly),
            ScopeHint::EntityLocal
        );
    }

    #[test]
    fn node_reference_is_scene_wide() {
        let info = AttributeInfo::new("Target", "").as_node_reference();
        assert!(info.is_node_reference());
        assert_eq!(info.scope_hint(), ScopeHint::SceneWide);
    }

    #[test]
    fn component_scope_is_widest_attribute() {
        let info = ComponentTypeInfo::new("StaticModel")
            .with_attribute(AttributeInfo::new("Model", "").with_scope(ScopeHint::EntityLocal))
            .with_attribute(AttributeInfo::new("Cast Shadows", false));
        assert_eq!(info.scope_hint(), ScopeHint::EntityLocal);
        assert_eq!(
            ComponentTypeInfo::new("Empty").scope_hint(),
            ScopeHint::AttributeOnly
        );
    }

    #[test]
    fn attributes_set_and_get() {
        let mut attrs = Attributes::new();
        assert_eq!(attrs.set("a", Value::from(1_i64)), None);
        assert_eq!(attrs.set("a", Value::from(2_i64)), Some(Value::from(1_i64)));
        assert_eq!(attrs.get("a"), Some(&Value::from(2_i64)));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn registry_replaces_types() {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentTypeInfo::new("Light"));
        registry.register(
            ComponentTypeInfo::new("Light").with_attribute(AttributeInfo::new("Range", 10.0_f32)),
        );
        assert_eq!(registry.components().count(), 1);
        assert!(registry.component("Light").unwrap().attribute("Range").is_some());
        assert_eq!(
            registry.node_attribute(NAME).map(AttributeInfo::scope_hint),
            Some(ScopeHint::SceneWide)
        );
    }
}
