//! Convention-driven scanning of a hierarchy into field entries.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CollisionError, Diagnostic, ResolutionError};
use crate::naming::{self, NamingConfig};
use crate::scene::{ComponentRef, NodeId, Scene};
use crate::type_map::TypeMap;

/// One generated field name bound to a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Generated field identifier.
    pub name: String,
    /// Borrowed handle into the scene.
    pub component: ComponentRef,
}

/// Entries and diagnostics produced by one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionResult {
    /// Field entries in traversal order.
    pub entries: Vec<FieldEntry>,
    /// Problems recorded during the scan.
    pub diagnostics: Vec<Diagnostic>,
}

/// A strategy that scans a hierarchy into field entries.
pub trait Collector {
    /// Scans `root` and every node beneath it.
    fn collect(
        &self,
        scene: &Scene,
        root: NodeId,
        naming: &NamingConfig,
        type_map: &TypeMap,
    ) -> CollectionResult;
}

/// The stock collector: `Key_Key_Base` node names, first writer wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCollector;

impl Collector for DefaultCollector {
    fn collect(
        &self,
        scene: &Scene,
        root: NodeId,
        naming: &NamingConfig,
        type_map: &TypeMap,
    ) -> CollectionResult {
        let mut scan = Scan::default();
        for id in scene.descendants(root) {
            scan.visit(scene, id, naming, type_map);
        }
        tracing::debug!(
            entries = scan.result.entries.len(),
            diagnostics = scan.result.diagnostics.len(),
            "collected components"
        );
        scan.result
    }
}

#[derive(Default)]
struct Scan {
    result: CollectionResult,
    owners: HashMap<String, String>,
}

impl Scan {
    fn visit(&mut self, scene: &Scene, id: NodeId, naming: &NamingConfig, type_map: &TypeMap) {
        let Some(node) = scene.node(id) else {
            return;
        };
        let Some(parsed) = naming::parse(node.name(), naming.separator) else {
            return;
        };

        for key in parsed.type_keys() {
            let Some(type_name) = type_map.type_name(key) else {
                self.report(ResolutionError::UnresolvedTypeKey {
                    node: node.name().to_owned(),
                    key: key.to_owned(),
                });
                continue;
            };

            let Some(component) = scene.component_of_type(id, type_name) else {
                self.report(ResolutionError::MissingComponent {
                    node: node.name().to_owned(),
                    type_name: type_name.to_owned(),
                });
                continue;
            };

            let field = naming.field_name(parsed.base(), key, type_name);
            if let Some(owner) = self.owners.get(&field) {
                let collision = CollisionError {
                    field,
                    node: node.name().to_owned(),
                    owner: owner.clone(),
                };
                self.report(collision);
                continue;
            }

            self.owners.insert(field.clone(), node.name().to_owned());
            self.result.entries.push(FieldEntry {
                name: field,
                component,
            });
        }
    }

    fn report(&mut self, problem: impl Into<Diagnostic>) {
        let diagnostic = problem.into();
        tracing::warn!("{diagnostic}");
        self.result.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests panic on setup failures")]
mod tests {
    //! Tests for the default collector.

    use super::*;
    use crate::naming::FieldNameRule;
    use crate::type_map::TypeKeyMapping;
    use rstest::{fixture, rstest};

    #[fixture]
    fn type_map() -> TypeMap {
        TypeMap::from_mappings(&[
            TypeKeyMapping::new("Text", "Text"),
            TypeKeyMapping::new("Image", "Image"),
            TypeKeyMapping::new("Button", "Button"),
        ])
    }

    fn scan(scene: &Scene, naming: &NamingConfig, type_map: &TypeMap) -> CollectionResult {
        DefaultCollector.collect(scene, scene.root(), naming, type_map)
    }

    fn field_names(result: &CollectionResult) -> Vec<&str> {
        result.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[rstest]
    fn binds_field_to_node_component(type_map: TypeMap) {
        let mut scene = Scene::new("Panel");
        let root = scene.root();
        scene.add_child(root, "Text_Title", ["Text"]);

        let result = scan(&scene, &NamingConfig::new("m_", FieldNameRule::ByTypeKey), &type_map);

        assert_eq!(field_names(&result), ["m_TitleText"]);
        assert!(result.diagnostics.is_empty());
        let entry = result.entries.first().expect("one entry");
        assert_eq!(entry.component.node, "Text_Title");
        assert_eq!(entry.component.type_name, "Text");
    }

    #[rstest]
    fn ineligible_names_are_silent(type_map: TypeMap) {
        let mut scene = Scene::new("Panel");
        let root = scene.root();
        scene.add_child(root, "Foo", ["Text"]);

        let result = scan(&scene, &NamingConfig::new("m_", FieldNameRule::ByTypeKey), &type_map);

        assert_eq!(result, CollectionResult::default());
    }

    #[rstest]
    fn unresolved_key_does_not_stop_other_segments(type_map: TypeMap) {
        let mut scene = Scene::new("Panel");
        let root = scene.root();
        scene.add_child(root, "Widget_Button_Ok", ["Button"]);

        let result = scan(&scene, &NamingConfig::new("", FieldNameRule::ByTypeKey), &type_map);

        assert_eq!(field_names(&result), ["okButton"]);
        assert_eq!(
            result.diagnostics,
            [Diagnostic::Resolution(ResolutionError::UnresolvedTypeKey {
                node: "Widget_Button_Ok".to_owned(),
                key: "Widget".to_owned(),
            })]
        );
    }

    #[rstest]
    fn missing_component_is_reported(type_map: TypeMap) {
        let mut scene = Scene::new("Panel");
        let root = scene.root();
        scene.add_child(root, "Image_Text_Icon", ["Image"]);
        scene.add_child(root, "Text_Label", ["Text"]);

        let result = scan(&scene, &NamingConfig::new("m_", FieldNameRule::ByTypeName), &type_map);

        assert_eq!(field_names(&result), ["m_IconImage", "m_LabelText"]);
        assert_eq!(
            result.diagnostics,
            [Diagnostic::Resolution(ResolutionError::MissingComponent {
                node: "Image_Text_Icon".to_owned(),
                type_name: "Text".to_owned(),
            })]
        );
    }

    #[rstest]
    fn duplicate_fields_keep_first_writer(type_map: TypeMap) {
        let mut scene = Scene::new("Panel");
        let root = scene.root();
        let first = scene
            .add_child(root, "Text_Title", ["Text"])
            .expect("first title");
        scene.add_child(root, "Text_Title", ["Text"]);
        scene.add_child(root, "Text_Title", ["Text"]);

        let result = scan(&scene, &NamingConfig::new("m_", FieldNameRule::ByTypeKey), &type_map);

        assert_eq!(field_names(&result), ["m_TitleText"]);
        let entry = result.entries.first().expect("retained entry");
        assert_eq!(
            Some(&entry.component.path),
            scene.node(first).map(crate::scene::Node::path)
        );
        assert_eq!(result.diagnostics.len(), 2);
        assert!(result
            .diagnostics
            .iter()
            .all(|diagnostic| matches!(diagnostic, Diagnostic::Collision(c) if c.field == "m_TitleText")));
    }

    #[rstest]
    fn root_node_is_scanned(type_map: TypeMap) {
        let mut scene = Scene::new("Image_Background");
        let root = scene.root();
        assert!(scene.add_component(&crate::scene::NodePath::root(), "Image"));
        scene.add_child(root, "Text_Title", ["Text"]);

        let result = scan(&scene, &NamingConfig::new("m_", FieldNameRule::ByTypeKey), &type_map);

        assert_eq!(field_names(&result), ["m_BackgroundImage", "m_TitleText"]);
    }

    #[rstest]
    fn repeated_scans_are_identical(type_map: TypeMap) {
        let mut scene = Scene::new("Panel");
        let root = scene.root();
        scene.add_child(root, "Text_Title", ["Text"]);
        scene.add_child(root, "Nope_Text_Title", ["Text"]);
        let naming = NamingConfig::new("m_", FieldNameRule::ByTypeKey);

        assert_eq!(scan(&scene, &naming, &type_map), scan(&scene, &naming, &type_map));
    }
}
