//! Layout Renderer
//!
//! Turns a [`LayoutDescription`] into DOM under a container. CSS grid and
//! flex place immediate children, so components sharing a placement area
//! are gathered under one synthetic wrapper that occupies the slot and lays
//! its members out with its own display mode.
//!
//! Element configuration failures are isolated: a component that cannot be
//! created or configured is logged and skipped, its siblings still render.

use crate::error::ElementConfigurationError;
use crate::model::{ComponentReference, LayoutDescription, StyleMap, PLACEMENT_STYLE};
use crate::HostDom;
use mosaic_dom::{DomError, DomOps, DomResult, ElementDefinitions, NodeId, PropertyValue};

/// Display mode of a shared-area wrapper without `innerLayout`
pub const DEFAULT_INNER_LAYOUT: &str = "block";
/// Class of the node carrying a page error message
pub const ERROR_CLASS: &str = "error-feedback";
/// Class of the node shown while a page is loading
pub const LOADING_CLASS: &str = "loading-indicator";

/// Nodes created by one render cycle, in creation order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CreatedNodeSet {
    nodes: Vec<NodeId>,
}

impl CreatedNodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Detach every tracked node still under `container` and forget them all
    ///
    /// Nodes nested in a tracked wrapper go away with it; nodes something else
    /// already moved out of the container are left alone.
    pub fn clear(&mut self, dom: &mut dyn HostDom, container: NodeId) {
        for node in self.nodes.drain(..).rev() {
            if node != container && dom.contains(container, node) {
                // Nodes nested in a wrapper leave with it
                if let Err(err) = detach(dom, container, node) {
                    tracing::warn!(%node, error = %err, "could not remove created node");
                }
            }
        }
    }
}

fn detach(dom: &mut dyn HostDom, container: NodeId, node: NodeId) -> DomResult<()> {
    match dom.remove_child(container, node) {
        Err(DomError::NotAChild) => Ok(()),
        other => other,
    }
}

/// Components sharing one placement area, in list order
#[derive(Debug, Clone, PartialEq)]
pub struct AreaGroup<'a> {
    pub area: String,
    pub members: Vec<&'a ComponentReference>,
}

/// Group by placement area: areas by first appearance, members by list order
pub fn group_by_area(components: &[ComponentReference]) -> Vec<AreaGroup<'_>> {
    let mut groups: Vec<AreaGroup<'_>> = Vec::new();
    for component in components {
        let area = component.placement_area();
        match groups.iter_mut().find(|g| g.area == area) {
            Some(group) => group.members.push(component),
            None => groups.push(AreaGroup { area, members: vec![component] }),
        }
    }
    groups
}

/// Stateless layout renderer
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutRenderer;

impl LayoutRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a layout into `container`, replacing what `created` tracks
    ///
    /// Fails only when the container itself cannot be styled; per-element
    /// problems are logged and skipped.
    pub fn render(
        &self,
        description: &LayoutDescription,
        dom: &mut dyn HostDom,
        container: NodeId,
        created: &mut CreatedNodeSet,
    ) -> DomResult<()> {
        created.clear(dom, container);

        dom.set_style(container, "display", &description.layout_mode)?;
        for (name, value) in description.container_styles.iter() {
            if !name.eq_ignore_ascii_case("display") {
                dom.set_style(container, name, &value)?;
            }
        }

        let groups = group_by_area(&description.components);
        tracing::debug!(
            layout = %description.layout_mode,
            areas = groups.len(),
            components = description.components.len(),
            "rendering page"
        );

        for group in groups {
            match group.members.as_slice() {
                [single] => self.render_isolated(single, &single.styles, dom, container, created),
                members => {
                    if let Err(err) = self.render_group(&group.area, members, dom, container, created) {
                        tracing::error!(area = %group.area, error = %err, "could not create area wrapper");
                    }
                }
            }
        }
        Ok(())
    }

    fn render_group(
        &self,
        area: &str,
        members: &[&ComponentReference],
        dom: &mut dyn HostDom,
        container: NodeId,
        created: &mut CreatedNodeSet,
    ) -> DomResult<()> {
        tracing::debug!(area, members = members.len(), "creating wrapper for shared area");
        let wrapper = dom.create_element("div")?;
        dom.set_style(wrapper, PLACEMENT_STYLE, area)?;

        let first = &members[0].config;
        let inner_layout = first.inner_layout().unwrap_or(DEFAULT_INNER_LAYOUT);
        dom.set_style(wrapper, "display", inner_layout)?;
        for (name, value) in first.inner_layout_styles().iter() {
            if name.eq_ignore_ascii_case("display") {
                continue;
            }
            if let Err(err) = dom.set_style(wrapper, name, &value) {
                tracing::warn!(area, style = %name, error = %err, "skipping inner layout style");
            }
        }

        dom.append_child(container, wrapper)?;
        created.push(wrapper);

        for member in members {
            let mut styles = member.styles.clone();
            styles.remove(PLACEMENT_STYLE);
            self.render_isolated(member, &styles, dom, wrapper, created);
        }
        Ok(())
    }

    fn render_isolated(
        &self,
        component: &ComponentReference,
        styles: &StyleMap,
        dom: &mut dyn HostDom,
        parent: NodeId,
        created: &mut CreatedNodeSet,
    ) {
        match self.render_component(component, styles, dom, parent) {
            Ok(node) => created.push(node),
            Err(err) => tracing::error!(error = %err, "skipping component"),
        }
    }

    /// Create, configure and attach one element
    pub fn render_component(
        &self,
        component: &ComponentReference,
        styles: &StyleMap,
        dom: &mut dyn HostDom,
        parent: NodeId,
    ) -> Result<NodeId, ElementConfigurationError> {
        let name = component.element_name.as_str();
        let fail = |source| ElementConfigurationError { element_name: name.to_string(), source };

        if !dom.is_defined(name) {
            tracing::warn!(element = name, "custom element not defined before creation");
        }

        let element = dom.create_element(name).map_err(fail)?;

        for (style, value) in styles.iter() {
            dom.set_style(element, style, &value).map_err(fail)?;
        }

        for (prop, value) in component.config.properties() {
            assign(dom, element, name, prop, value).map_err(fail)?;
        }

        dom.append_child(parent, element).map_err(fail)?;
        tracing::debug!(element = name, node = %element, "element rendered");
        Ok(element)
    }

    /// Replace tracked content with a single message node
    pub fn render_message(
        &self,
        class: &str,
        message: &str,
        dom: &mut dyn HostDom,
        container: NodeId,
        created: &mut CreatedNodeSet,
    ) -> DomResult<NodeId> {
        created.clear(dom, container);
        let node = dom.create_element("div")?;
        dom.add_class(node, class)?;
        dom.set_text_content(node, message)?;
        dom.append_child(container, node)?;
        created.push(node);
        Ok(node)
    }

    /// Render the page error state
    pub fn render_error(
        &self,
        message: &str,
        dom: &mut dyn HostDom,
        container: NodeId,
        created: &mut CreatedNodeSet,
    ) -> DomResult<NodeId> {
        self.render_message(ERROR_CLASS, message, dom, container, created)
    }
}

/// Property first; if the element refuses it, fall back to an attribute
///
/// Custom elements differ in which inputs they expose as properties, so a
/// refused property is still delivered as a string (or JSON) attribute.
fn assign(dom: &mut dyn HostDom, element: NodeId, name: &str, prop: &str, value: &PropertyValue) -> DomResult<()> {
    match dom.set_property(element, prop, value) {
        Ok(()) => Ok(()),
        Err(err @ DomError::PropertyRejected { .. }) => {
            tracing::warn!(element = name, property = prop, error = %err, "property rejected, setting attribute");
            let attr = match value {
                PropertyValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            dom.set_attribute(element, prop, &attr)
        }
        Err(err) => Err(err),
    }
}
