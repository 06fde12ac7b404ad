//! Component registry for polymorphic save and load
//!
//! Maps a component type name to a pair of function pointers: one turns a
//! live component into JSON fields, the other builds a boxed component from
//! fields. Scenes use it to save, to load, and to add components by name.

use std::collections::HashMap;

use log::trace;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::record::ComponentRecord;
use crate::ecs::component::short_type_name;
use crate::ecs::components::{BoxColliderData, CircleColliderData, Collider, Transform, TransformData};
use crate::ecs::{Component, SceneError};

/// Serialize a component; `None` when the component is not of the registered type
pub type SaveFn = fn(&(dyn Component + 'static)) -> Option<serde_json::Result<Value>>;

/// Build a component from saved fields
pub type LoadFn = fn(Value) -> serde_json::Result<Box<dyn Component>>;

/// Record keys owned by the scene format; component fields may not use them
pub const RESERVED_KEYS: [&str; 2] = ["type", "enabled"];

#[derive(Clone, Copy)]
struct ComponentFns {
    save: SaveFn,
    load: LoadFn,
}

/// Maps component type names to save/load function pointers
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    by_name: HashMap<String, ComponentFns>,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `Transform`, `BoxCollider` and `CircleCollider`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_with("Transform", save_transform, load_transform);
        registry.register_with("BoxCollider", save_box_collider, load_box_collider);
        registry.register_with("CircleCollider", save_circle_collider, load_circle_collider);
        registry
    }

    /// Register a serde component under its short type name
    ///
    /// The name must match what [`Component::type_name`] returns for `T`,
    /// which holds unless `T` overrides it; use [`register_named`](Self::register_named)
    /// in that case.
    pub fn register<T>(&mut self)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        self.register_named::<T>(short_type_name(std::any::type_name::<T>()));
    }

    /// Register a serde component under an explicit name
    pub fn register_named<T>(&mut self, name: impl Into<String>)
    where
        T: Component + Serialize + DeserializeOwned,
    {
        self.register_with(name, save_serde::<T>, load_serde::<T>);
    }

    /// Register custom save/load functions under a name
    pub fn register_with(&mut self, name: impl Into<String>, save: SaveFn, load: LoadFn) {
        let name = name.into();
        trace!("Registering component type {}", name);
        self.by_name.insert(name, ComponentFns { save, load });
    }

    /// Whether a type name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Build a component from fields; `None` when `name` is not registered
    pub fn construct(&self, name: &str, fields: Value) -> Option<serde_json::Result<Box<dyn Component>>> {
        let fns = self.by_name.get(name)?;
        Some((fns.load)(fields))
    }

    /// Save one component into a record
    ///
    /// A component whose fields include one of [`RESERVED_KEYS`] fails with
    /// [`SceneError::InvalidComponentData`], since the saved record could not
    /// be told apart from the record's own `type` and `enabled` keys.
    pub fn save_component(
        &self,
        component: &(dyn Component + 'static),
        enabled: bool,
    ) -> Result<ComponentRecord, SceneError> {
        let type_name = component.type_name();
        let fns = self
            .by_name
            .get(type_name)
            .ok_or_else(|| SceneError::UnregisteredComponent(type_name.to_string()))?;

        let value = (fns.save)(component)
            .ok_or_else(|| SceneError::UnregisteredComponent(type_name.to_string()))?
            .map_err(|source| invalid_data(type_name, source))?;

        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            _ => return Err(invalid_data(type_name, custom_error("component must serialize to a JSON object"))),
        };
        if let Some(key) = RESERVED_KEYS.iter().find(|key| fields.contains_key(**key)) {
            return Err(invalid_data(
                type_name,
                custom_error(format!("field `{key}` is reserved by the scene format")),
            ));
        }

        Ok(ComponentRecord {
            type_name: type_name.to_string(),
            enabled,
            fields,
        })
    }

    /// Build a component from a record
    ///
    /// Fails with [`SceneError::UnknownComponentType`] for unregistered names.
    pub fn load_component(&self, record: &ComponentRecord) -> Result<Box<dyn Component>, SceneError> {
        let fns = self
            .by_name
            .get(&record.type_name)
            .ok_or_else(|| SceneError::UnknownComponentType(record.type_name.clone()))?;

        match (fns.load)(Value::Object(record.fields.clone())) {
            Ok(component) => Ok(component),
            // fieldless unit components save as null
            Err(_) if record.fields.is_empty() => {
                (fns.load)(Value::Null).map_err(|source| invalid_data(&record.type_name, source))
            }
            Err(source) => Err(invalid_data(&record.type_name, source)),
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.names())
            .finish()
    }
}

fn custom_error(message: impl std::fmt::Display) -> serde_json::Error {
    <serde_json::Error as serde::ser::Error>::custom(message)
}

fn invalid_data(type_name: &str, source: serde_json::Error) -> SceneError {
    SceneError::InvalidComponentData {
        type_name: type_name.to_string(),
        source,
    }
}

fn save_serde<T: Component + Serialize>(component: &(dyn Component + 'static)) -> Option<serde_json::Result<Value>> {
    component.downcast_ref::<T>().map(serde_json::to_value)
}

fn load_serde<T: Component + DeserializeOwned>(fields: Value) -> serde_json::Result<Box<dyn Component>> {
    let component: T = serde_json::from_value(fields)?;
    Ok(Box::new(component))
}

fn save_transform(component: &(dyn Component + 'static)) -> Option<serde_json::Result<Value>> {
    component
        .downcast_ref::<Transform>()
        .map(|transform| serde_json::to_value(TransformData::from(transform)))
}

fn load_transform(fields: Value) -> serde_json::Result<Box<dyn Component>> {
    let data: TransformData = serde_json::from_value(fields)?;
    Ok(Box::new(Transform::from(data)))
}

fn save_box_collider(component: &(dyn Component + 'static)) -> Option<serde_json::Result<Value>> {
    component
        .downcast_ref::<Collider>()
        .and_then(Collider::box_data)
        .map(serde_json::to_value)
}

fn load_box_collider(fields: Value) -> serde_json::Result<Box<dyn Component>> {
    let data: BoxColliderData = serde_json::from_value(fields)?;
    Ok(Box::new(Collider::from(data)))
}

fn save_circle_collider(component: &(dyn Component + 'static)) -> Option<serde_json::Result<Value>> {
    component
        .downcast_ref::<Collider>()
        .and_then(Collider::circle_data)
        .map(serde_json::to_value)
}

fn load_circle_collider(fields: Value) -> serde_json::Result<Box<dyn Component>> {
    let data: CircleColliderData = serde_json::from_value(fields)?;
    Ok(Box::new(Collider::from(data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Health {
        current: u32,
        max: u32,
    }
    impl Component for Health {}

    #[derive(Serialize, Deserialize)]
    struct Marker;
    impl Component for Marker {}

    #[test]
    fn test_builtins_registered() {
        let registry = ComponentRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["BoxCollider", "CircleCollider", "Transform"]);
    }

    #[test]
    fn test_custom_component_round_trip() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Health>();

        let health = Health { current: 3, max: 10 };
        let record = registry.save_component(&health, false).unwrap();
        assert_eq!(record.type_name, "Health");
        assert!(!record.enabled);
        assert_eq!(record.fields.get("max"), Some(&json!(10)));

        let loaded = registry.load_component(&record).unwrap();
        assert_eq!(loaded.downcast_ref::<Health>(), Some(&health));
    }

    #[test]
    fn test_unit_component_round_trip() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Marker>();

        let record = registry.save_component(&Marker, true).unwrap();
        assert!(record.fields.is_empty());
        assert!(registry.load_component(&record).unwrap().is::<Marker>());
    }

    #[test]
    fn test_unknown_and_unregistered_types() {
        let registry = ComponentRegistry::with_builtins();

        let result = registry.load_component(&ComponentRecord::new("Spaceship"));
        assert!(matches!(result, Err(SceneError::UnknownComponentType(name)) if name == "Spaceship"));

        let result = registry.save_component(&Health { current: 1, max: 1 }, true);
        assert!(matches!(result, Err(SceneError::UnregisteredComponent(name)) if name == "Health"));
    }

    #[test]
    fn test_bad_fields_are_reported() {
        let registry = ComponentRegistry::with_builtins();
        let mut record = ComponentRecord::new("CircleCollider");
        record.fields.insert("radius".to_string(), json!("large"));

        assert!(matches!(
            registry.load_component(&record),
            Err(SceneError::InvalidComponentData { .. })
        ));
    }

    #[test]
    fn test_construct_by_name() {
        let registry = ComponentRegistry::with_builtins();

        let component = registry
            .construct("Transform", json!({ "position": [1.0, 2.0] }))
            .unwrap()
            .unwrap();
        let transform = component.downcast_ref::<Transform>().unwrap();
        assert_eq!(transform.position.x, 1.0);
        assert_eq!(transform.scale.x, 1.0);

        assert!(registry.construct("Nothing", json!({})).is_none());
    }

    #[derive(Serialize, Deserialize)]
    struct Lamp {
        enabled: bool,
        brightness: f32,
    }
    impl Component for Lamp {}

    #[derive(Serialize, Deserialize)]
    struct Tagged {
        #[serde(rename = "type")]
        kind: String,
    }
    impl Component for Tagged {}

    #[test]
    fn test_fields_clashing_with_record_keys_are_rejected() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Lamp>();
        registry.register::<Tagged>();

        let lamp = Lamp {
            enabled: false,
            brightness: 0.5,
        };
        let result = registry.save_component(&lamp, true);
        assert!(matches!(
            result,
            Err(SceneError::InvalidComponentData { type_name, .. }) if type_name == "Lamp"
        ));

        let tagged = Tagged {
            kind: "door".to_string(),
        };
        assert!(matches!(
            registry.save_component(&tagged, true),
            Err(SceneError::InvalidComponentData { .. })
        ));
    }
}
