//! Layout model
//!
//! Wire format of a page configuration:
//!
//! ```json
//! {
//!   "layout": "grid",
//!   "containerStyles": { "gridTemplateColumns": "1fr 1fr" },
//!   "components": [
//!     { "elementName": "app-header", "scriptUrl": "/mfe/header.js",
//!       "styles": { "grid-area": "header" }, "config": { "title": "Home" } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Style key used to pick a component's layout slot
pub const PLACEMENT_STYLE: &str = "grid-area";
/// Area components without a [`PLACEMENT_STYLE`] share
pub const DEFAULT_AREA: &str = "default";
/// Config key choosing the display mode of a shared-area wrapper
pub const INNER_LAYOUT_KEY: &str = "innerLayout";
/// Config key holding extra styles for a shared-area wrapper
pub const INNER_LAYOUT_STYLES_KEY: &str = "innerLayoutStyles";

/// Layout description could not be decoded
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("malformed layout document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("layout mode is empty")]
    EmptyLayout,
}

/// Ordered style-property map
///
/// Values may be strings or numbers in JSON; both are applied as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(Map<String, Value>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a declaration
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), Value::String(value.into()));
    }

    /// Value of one declaration
    pub fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(style_value)
    }

    /// Drop a declaration
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.shift_remove(name).as_ref().and_then(style_value)
    }

    /// Declarations in document order, null or structured values skipped
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> {
        self.0.iter().filter_map(|(k, v)| style_value(v).map(|v| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

fn style_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Property map applied to a created element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementConfig(Map<String, Value>);

impl ElementConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Display mode for the wrapper of a shared area
    pub fn inner_layout(&self) -> Option<&str> {
        self.0.get(INNER_LAYOUT_KEY).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Extra styles for the wrapper of a shared area
    pub fn inner_layout_styles(&self) -> StyleMap {
        match self.0.get(INNER_LAYOUT_STYLES_KEY) {
            Some(Value::Object(map)) => StyleMap(map.clone()),
            _ => StyleMap::default(),
        }
    }

    /// Entries to apply to the element itself
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter()
            .filter(|(k, _)| k.as_str() != INNER_LAYOUT_KEY && k.as_str() != INNER_LAYOUT_STYLES_KEY)
            .map(|(k, v)| (k.as_str(), v))
    }
}

/// One custom element to instantiate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReference {
    /// Tag name to create
    #[serde(default)]
    pub element_name: String,
    /// Standalone bundle defining the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_url: Option<String>,
    /// Federated remote exposing the element
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_name: Option<String>,
    /// Module path within the remote, e.g. `./web-component`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposed_module: Option<String>,
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default)]
    pub config: ElementConfig,
}

/// How a component's definition gets into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStrategy<'a> {
    Federated { remote_name: &'a str, exposed_module: &'a str },
    Script(&'a str),
    /// Nothing to load; the element is assumed defined already
    Preloaded,
}

impl ComponentReference {
    pub fn new(element_name: impl Into<String>) -> Self {
        Self { element_name: element_name.into(), ..Default::default() }
    }

    pub fn with_script(mut self, url: impl Into<String>) -> Self {
        self.script_url = Some(url.into());
        self
    }

    pub fn with_remote(mut self, remote_name: impl Into<String>, exposed_module: impl Into<String>) -> Self {
        self.remote_name = Some(remote_name.into());
        self.exposed_module = Some(exposed_module.into());
        self
    }

    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(name, value);
        self
    }

    pub fn with_config(mut self, name: impl Into<String>, value: Value) -> Self {
        self.config.insert(name, value);
        self
    }

    /// Loading strategy; a complete federated pair wins over a script URL
    pub fn load_strategy(&self) -> LoadStrategy<'_> {
        match (present(&self.remote_name), present(&self.exposed_module), present(&self.script_url)) {
            (Some(remote_name), Some(exposed_module), _) => LoadStrategy::Federated { remote_name, exposed_module },
            (_, _, Some(url)) => LoadStrategy::Script(url),
            _ => LoadStrategy::Preloaded,
        }
    }

    /// Resource this component's definition comes from
    pub fn resource_key(&self) -> Option<ResourceKey> {
        match self.load_strategy() {
            LoadStrategy::Federated { remote_name, exposed_module } => Some(ResourceKey::Module {
                remote_name: remote_name.to_string(),
                exposed_module: exposed_module.to_string(),
            }),
            LoadStrategy::Script(url) => Some(ResourceKey::Script(url.to_string())),
            LoadStrategy::Preloaded => None,
        }
    }

    /// Layout slot this component occupies
    pub fn placement_area(&self) -> String {
        self.styles.get(PLACEMENT_STYLE)
            .filter(|area| !area.is_empty())
            .unwrap_or_else(|| DEFAULT_AREA.to_string())
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Identity of a loadable resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Script(String),
    Module { remote_name: String, exposed_module: String },
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Script(url) => f.write_str(url),
            ResourceKey::Module { remote_name, exposed_module } => write!(f, "{remote_name}:{exposed_module}"),
        }
    }
}

/// Validated layout of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescription {
    /// CSS display mode of the page container (`grid`, `flex`, ...)
    #[serde(rename = "layout")]
    pub layout_mode: String,
    #[serde(default)]
    pub container_styles: StyleMap,
    pub components: Vec<ComponentReference>,
}

impl LayoutDescription {
    pub fn new(layout_mode: impl Into<String>, components: Vec<ComponentReference>) -> Self {
        Self {
            layout_mode: layout_mode.into(),
            container_styles: StyleMap::default(),
            components,
        }
    }

    /// Decode and validate a layout document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LayoutError> {
        let description: LayoutDescription = serde_json::from_slice(bytes)?;
        if description.layout_mode.trim().is_empty() {
            return Err(LayoutError::EmptyLayout);
        }
        Ok(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_document() {
        let doc = br#"{
            "layout": "grid",
            "containerStyles": { "gridTemplateColumns": "1fr 1fr", "gap": "1rem" },
            "components": [
                { "elementName": "app-header", "styles": { "grid-area": "header" }, "config": { "title": "Home" } },
                { "elementName": "mfe2-root", "remoteName": "mfe2", "exposedModule": "./web-component" }
            ]
        }"#;
        let layout = LayoutDescription::from_slice(doc).unwrap();

        assert_eq!(layout.layout_mode, "grid");
        assert_eq!(layout.container_styles.len(), 2);
        assert_eq!(layout.components[0].placement_area(), "header");
        assert_eq!(layout.components[1].placement_area(), DEFAULT_AREA);
        assert_eq!(
            layout.components[1].load_strategy(),
            LoadStrategy::Federated { remote_name: "mfe2", exposed_module: "./web-component" }
        );
    }

    #[test]
    fn test_missing_layout_is_invalid() {
        assert!(LayoutDescription::from_slice(br#"{"components": []}"#).is_err());
        assert!(LayoutDescription::from_slice(br#"{"layout": "", "components": []}"#).is_err());
    }

    #[test]
    fn test_non_array_components_is_invalid() {
        assert!(LayoutDescription::from_slice(br#"{"layout": "grid", "components": {}}"#).is_err());
        assert!(LayoutDescription::from_slice(br#"{"layout": "grid"}"#).is_err());
    }

    #[test]
    fn test_container_styles_keep_order() {
        let layout = LayoutDescription::from_slice(
            br#"{"layout": "flex", "containerStyles": {"z": "1", "a": "2", "m": "3"}, "components": []}"#,
        ).unwrap();
        let names: Vec<_> = layout.container_styles.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_numeric_style_values() {
        let comp: ComponentReference = serde_json::from_value(json!({
            "elementName": "x-a", "styles": { "order": 2, "flexGrow": 1.5 }
        })).unwrap();
        assert_eq!(comp.styles.get("order").as_deref(), Some("2"));
        assert_eq!(comp.styles.get("flexGrow").as_deref(), Some("1.5"));
    }

    #[test]
    fn test_load_strategy_precedence() {
        let both = ComponentReference::new("x-a")
            .with_script("/a.js")
            .with_remote("mfe", "./a");
        assert!(matches!(both.load_strategy(), LoadStrategy::Federated { .. }));

        let half_remote = ComponentReference {
            remote_name: Some("mfe".into()),
            ..ComponentReference::new("x-a").with_script("/a.js")
        };
        assert_eq!(half_remote.load_strategy(), LoadStrategy::Script("/a.js"));

        let empty_script = ComponentReference::new("x-a").with_script("");
        assert_eq!(empty_script.load_strategy(), LoadStrategy::Preloaded);
    }

    #[test]
    fn test_reserved_config_keys_excluded() {
        let comp = ComponentReference::new("x-a")
            .with_config(INNER_LAYOUT_KEY, json!("flex"))
            .with_config(INNER_LAYOUT_STYLES_KEY, json!({"gap": "4px"}))
            .with_config("title", json!("Hi"));

        let props: Vec<_> = comp.config.properties().map(|(k, _)| k).collect();
        assert_eq!(props, vec!["title"]);
        assert_eq!(comp.config.inner_layout(), Some("flex"));
        assert_eq!(comp.config.inner_layout_styles().get("gap").as_deref(), Some("4px"));
    }

    #[test]
    fn test_resource_key_display() {
        let key = ComponentReference::new("x").with_remote("mfe2", "./web-component").resource_key().unwrap();
        assert_eq!(key.to_string(), "mfe2:./web-component");
        assert_eq!(ComponentReference::new("x").resource_key(), None);
    }
}
