//! In-memory scene hierarchy and non-owning component handles.
//!
//! A [`Scene`] is an arena of named nodes, each carrying an ordered list of
//! components. Components are addressed from outside the scene only through
//! [`ComponentRef`] values, which record where a component was found and can
//! go stale when the scene is edited afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, Result};
use crate::fs_helpers;

/// Arena index of a node within one [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Child-index path from the scene root; the empty path is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the scene root.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns the child indices making up this path.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");
        f.write_str(&joined)
    }
}

impl FromStr for NodePath {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        value
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::parse)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Self)
    }
}

/// A component instance owned by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    type_name: String,
}

impl Component {
    /// Concrete type name of the component.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// A node in the hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<Component>,
    path: NodePath,
}

impl Node {
    /// Display name of the node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in declaration order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Components in declaration order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Path of this node from the scene root.
    #[must_use]
    pub const fn path(&self) -> &NodePath {
        &self.path
    }
}

/// Non-owning handle to a component inside a [`Scene`].
///
/// The handle is live while its path resolves, the node there still carries
/// the recorded name, and that node still has a component of exactly
/// `type_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    /// Path of the owning node.
    pub path: NodePath,
    /// Owning node name at the time the handle was taken.
    pub node: String,
    /// Concrete component type.
    pub type_name: String,
}

/// Serialised form of a scene, read from TOML or JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneDocument {
    /// Inheritance table mapping a component type to its base types.
    #[serde(default)]
    pub types: BTreeMap<String, Vec<String>>,
    /// Root node of the hierarchy.
    pub root: NodeDocument,
}

/// Serialised form of one node.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeDocument {
    /// Node display name.
    pub name: String,
    /// Component type names carried by the node.
    #[serde(default)]
    pub components: Vec<String>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<NodeDocument>,
}

/// Scene hierarchy.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    inheritance: BTreeMap<String, Vec<String>>,
}

impl Scene {
    /// Creates a scene holding only a root node.
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                name: root_name.into(),
                parent: None,
                children: Vec::new(),
                components: Vec::new(),
                path: NodePath::root(),
            }],
            inheritance: BTreeMap::new(),
        }
    }

    /// Builds a scene from its document form.
    #[must_use]
    pub fn from_document(document: SceneDocument) -> Self {
        let SceneDocument { types, root } = document;
        let mut scene = Self::new(root.name);
        scene.inheritance = types;
        let root_id = scene.root();
        scene.attach_components(root_id, root.components);
        scene.attach_children(root_id, root.children);
        scene
    }

    fn attach_children(&mut self, parent: NodeId, children: Vec<NodeDocument>) {
        for child in children {
            let NodeDocument {
                name,
                components,
                children: grandchildren,
            } = child;
            if let Some(id) = self.add_child(parent, name, components) {
                self.attach_children(id, grandchildren);
            }
        }
    }

    fn attach_components(&mut self, id: NodeId, components: Vec<String>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.components
                .extend(components.into_iter().map(|type_name| Component { type_name }));
        }
    }

    /// Parses a scene from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML parser error when the document is malformed.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<SceneDocument>(text).map(Self::from_document)
    }

    /// Loads a scene document, choosing the parser from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Io`] when the file cannot be read and a
    /// parse error when the document is malformed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs_helpers::read_text(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let document: SceneDocument = if is_json {
            serde_json::from_str(&text).map_err(|source| CollectionError::JsonParse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            toml::from_str(&text).map_err(|source| CollectionError::TomlParse {
                path: path.to_path_buf(),
                source,
            })?
        };
        Ok(Self::from_document(document))
    }

    /// Declares `base` as a base type of `type_name`.
    pub fn declare_base(&mut self, type_name: impl Into<String>, base: impl Into<String>) {
        self.inheritance
            .entry(type_name.into())
            .or_default()
            .push(base.into());
    }

    /// Appends a child node under `parent`, returning its id.
    pub fn add_child<I, S>(&mut self, parent: NodeId, name: impl Into<String>, components: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parent_node = self.nodes.get(parent.0)?;
        let path = parent_node.path.child(parent_node.children.len());
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            components: components
                .into_iter()
                .map(|type_name| Component {
                    type_name: type_name.into(),
                })
                .collect(),
            path,
        });
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        Some(id)
    }

    /// Id of the root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Resolves a path to a node id.
    #[must_use]
    pub fn find(&self, path: &NodePath) -> Option<NodeId> {
        let mut current = self.root();
        for index in path.indices() {
            current = *self.node(current)?.children.get(*index)?;
        }
        Some(current)
    }

    /// Every node under `id`, `id` included, in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            ordered.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        ordered
    }

    /// Returns whether a component of type `actual` can stand in for `expected`.
    #[must_use]
    pub fn is_assignable(&self, actual: &str, expected: &str) -> bool {
        let mut visited = BTreeSet::new();
        let mut pending = vec![actual];
        while let Some(current) = pending.pop() {
            if current == expected {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(bases) = self.inheritance.get(current) {
                pending.extend(bases.iter().map(String::as_str));
            }
        }
        false
    }

    /// First component on the node assignable to `type_name`.
    #[must_use]
    pub fn component_of_type(&self, id: NodeId, type_name: &str) -> Option<ComponentRef> {
        let node = self.node(id)?;
        node.components
            .iter()
            .find(|component| self.is_assignable(&component.type_name, type_name))
            .map(|component| ComponentRef {
                path: node.path.clone(),
                node: node.name.clone(),
                type_name: component.type_name.clone(),
            })
    }

    /// Follows a handle back to its component, `None` when stale.
    #[must_use]
    pub fn resolve(&self, handle: &ComponentRef) -> Option<&Component> {
        let node = self.node(self.find(&handle.path)?)?;
        if node.name != handle.node {
            return None;
        }
        node.components
            .iter()
            .find(|component| component.type_name == handle.type_name)
    }

    /// Returns whether the handle still resolves.
    #[must_use]
    pub fn is_live(&self, handle: &ComponentRef) -> bool {
        self.resolve(handle).is_some()
    }

    /// Removes the first component of exactly `type_name` from a node.
    pub fn remove_component(&mut self, path: &NodePath, type_name: &str) -> bool {
        let Some(id) = self.find(path) else {
            return false;
        };
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        let Some(position) = node
            .components
            .iter()
            .position(|component| component.type_name == type_name)
        else {
            return false;
        };
        node.components.remove(position);
        true
    }

    /// Adds a component to the node at `path`.
    pub fn add_component(&mut self, path: &NodePath, type_name: impl Into<String>) -> bool {
        let Some(id) = self.find(path) else {
            return false;
        };
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        node.components.push(Component {
            type_name: type_name.into(),
        });
        true
    }

    /// Renames the node at `path`.
    pub fn rename_node(&mut self, path: &NodePath, name: impl Into<String>) -> bool {
        let Some(id) = self.find(path) else {
            return false;
        };
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };
        node.name = name.into();
        true
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests panic on setup failures")]
mod tests {
    //! Tests for the scene model.

    use super::*;
    use rstest::{fixture, rstest};

    const PANEL: &str = r#"
[types]
RectTransform = ["Transform"]

[root]
name = "Panel"
components = ["RectTransform"]

[[root.children]]
name = "Text_Title"
components = ["RectTransform", "Text"]

[[root.children]]
name = "Group"
components = ["RectTransform"]

[[root.children.children]]
name = "Button_Ok"
components = ["RectTransform", "Image", "Button"]
"#;

    #[fixture]
    fn panel() -> Scene {
        Scene::from_toml_str(PANEL).expect("panel scene parses")
    }

    fn names(scene: &Scene, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| scene.node(*id))
            .map(|node| node.name().to_owned())
            .collect()
    }

    #[rstest]
    fn descendants_are_pre_order_and_include_root(panel: Scene) {
        let ids = panel.descendants(panel.root());
        assert_eq!(
            names(&panel, &ids),
            vec!["Panel", "Text_Title", "Group", "Button_Ok"]
        );
    }

    #[rstest]
    fn paths_follow_child_indices(panel: Scene) {
        let id = panel.find(&NodePath::from(vec![1, 0])).expect("nested node");
        let node = panel.node(id).expect("node exists");
        assert_eq!(node.name(), "Button_Ok");
        assert_eq!(node.path().to_string(), "1/0");
        assert_eq!("1/0".parse::<NodePath>().expect("parse path"), *node.path());
        assert_eq!("/".parse::<NodePath>().expect("parse root"), NodePath::root());
    }

    #[rstest]
    fn component_lookup_honours_inheritance(panel: Scene) {
        let id = panel.find(&NodePath::from(vec![0])).expect("title node");
        let handle = panel
            .component_of_type(id, "Transform")
            .expect("rect transform is a transform");
        assert_eq!(handle.type_name, "RectTransform");
        assert!(panel.component_of_type(id, "Button").is_none());
    }

    #[rstest]
    fn handles_go_stale_after_edits(mut panel: Scene) {
        let id = panel.find(&NodePath::from(vec![0])).expect("title node");
        let handle = panel.component_of_type(id, "Text").expect("text component");
        assert!(panel.is_live(&handle));

        assert!(panel.rename_node(&handle.path, "Text_Heading"));
        assert!(!panel.is_live(&handle), "renamed node invalidates handle");

        assert!(panel.rename_node(&handle.path, "Text_Title"));
        assert!(panel.is_live(&handle));
        assert!(panel.remove_component(&handle.path, "Text"));
        assert!(!panel.is_live(&handle), "removed component invalidates handle");
    }

    #[rstest]
    fn inheritance_cycles_terminate() {
        let mut scene = Scene::new("Root");
        scene.declare_base("A", "B");
        scene.declare_base("B", "A");
        assert!(!scene.is_assignable("A", "C"));
        assert!(scene.is_assignable("A", "B"));
    }
}
