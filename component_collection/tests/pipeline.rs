//! End-to-end collection and generation against an in-memory scene.
#![expect(
    clippy::expect_used,
    reason = "tests panic to surface fixture mistakes"
)]

use camino::Utf8PathBuf;
use component_collection::error::{CollisionError, ResolutionError};
use component_collection::output::{AlwaysOverwrite, NeverOverwrite};
use component_collection::settings::{SettingsFile, Templates};
use component_collection::type_map::TypeKeyMapping;
use component_collection::{
    ArtifactSelection, CollectMode, CollectionError, CollectionTarget, ComponentKind, Diagnostic,
    NodePath, Orchestrator, Scene, Settings, Timestamp,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;
use test_helpers::fixtures::{BEHAVIOUR_TEMPLATE, COMPONENTS_TEMPLATE, EXTENSION_TEMPLATE, LOGIN_SCENE_TOML};
use test_helpers::text::mask_timestamps;

struct Project {
    _dir: TempDir,
    settings: Settings,
}

#[fixture]
fn project() -> Project {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir path is UTF-8");
    let values = SettingsFile {
        namespace: "Demo".to_owned(),
        code_save_path: Utf8PathBuf::from("Generated"),
        component_maps: vec![
            TypeKeyMapping::new("Text", "Text"),
            TypeKeyMapping::new("Image", "Image"),
            TypeKeyMapping::new("Img", "Image"),
            TypeKeyMapping::new("Button", "Button"),
        ],
        ..SettingsFile::default()
    };
    let templates = Templates {
        components: Some(COMPONENTS_TEMPLATE.to_owned()),
        behaviour: Some(BEHAVIOUR_TEMPLATE.to_owned()),
        extension: Some(EXTENSION_TEMPLATE.to_owned()),
    };
    Project {
        _dir: dir,
        settings: Settings::new(root, values, templates),
    }
}

#[fixture]
fn scene() -> Scene {
    Scene::from_toml_str(LOGIN_SCENE_TOML).expect("parse login scene")
}

fn collected(settings: &Settings, scene: &Scene) -> (CollectionTarget, Vec<Diagnostic>) {
    let mut target = CollectionTarget::default();
    target.setup_defaults(settings, "LoginPanel");
    let diagnostics = Orchestrator::new(settings)
        .collect(&mut target, scene, CollectMode::Update)
        .expect("collect login panel");
    (target, diagnostics)
}

fn field_names(target: &CollectionTarget) -> Vec<&str> {
    target.fields.iter().map(|entry| entry.name.as_str()).collect()
}

#[rstest]
fn scan_produces_fields_and_diagnostics(project: Project, scene: Scene) {
    let (target, diagnostics) = collected(&project.settings, &scene);

    assert_eq!(
        field_names(&target),
        ["m_TitleText", "m_OkImage", "m_OkButton", "m_AvatarImg", "m_HintText"]
    );
    assert_eq!(
        diagnostics,
        [
            Diagnostic::Resolution(ResolutionError::UnresolvedTypeKey {
                node: "Widget_Text_Hint".to_owned(),
                key: "Widget".to_owned(),
            }),
            Diagnostic::Collision(CollisionError {
                field: "m_TitleText".to_owned(),
                node: "Text_Title".to_owned(),
                owner: "Text_Title".to_owned(),
            }),
        ]
    );
    let avatar = target.fields.get(3).expect("avatar entry");
    assert_eq!(avatar.component.path, NodePath::from(vec![2, 0]));
}

#[rstest]
fn update_twice_is_stable(project: Project, scene: Scene) {
    let (first, first_diagnostics) = collected(&project.settings, &scene);
    let (second, second_diagnostics) = collected(&project.settings, &scene);
    assert_eq!(first, second);
    assert_eq!(first_diagnostics, second_diagnostics);
}

#[rstest]
fn scanning_a_subtree_uses_its_root(project: Project, scene: Scene) {
    let mut target = CollectionTarget {
        root: NodePath::from(vec![2]),
        ..CollectionTarget::default()
    };
    target.setup_defaults(&project.settings, "Content");
    Orchestrator::new(&project.settings)
        .collect(&mut target, &scene, CollectMode::Update)
        .expect("collect subtree");
    assert_eq!(field_names(&target), ["m_AvatarImg"]);

    target.root = NodePath::from(vec![9]);
    let err = Orchestrator::new(&project.settings)
        .collect(&mut target, &scene, CollectMode::Update)
        .expect_err("missing root");
    assert!(matches!(
        err,
        CollectionError::Resolution(ResolutionError::MissingNode(_))
    ));
    assert_eq!(field_names(&target), ["m_AvatarImg"]);
}

#[rstest]
fn components_artifact_matches_golden(project: Project, scene: Scene) {
    let (mut target, _) = collected(&project.settings, &scene);
    let report = Orchestrator::new(&project.settings)
        .generate(
            &mut target,
            &scene,
            ArtifactSelection::Components,
            &Timestamp::now(),
            &mut NeverOverwrite,
        )
        .expect("generate components");

    let artifact = report.artifacts.first().expect("components artifact");
    assert_eq!(
        artifact.path,
        project
            .settings
            .project_root()
            .join("Generated/LoginPanel.Components.cs")
    );
    let expected = "// <CREATED>
namespace Demo
{
    public partial class LoginPanel
    {
        private Text m_TitleText;
        private Image m_OkImage;
        private Button m_OkButton;
        private Image m_AvatarImg;
        private Text m_HintText;

        private void GetBindComponents(ComponentCollection collection)
        {
            m_TitleText = collection.GetComponent<Text>(0);
            m_OkImage = collection.GetComponent<Image>(1);
            m_OkButton = collection.GetComponent<Button>(2);
            m_AvatarImg = collection.GetComponent<Image>(3);
            m_HintText = collection.GetComponent<Text>(4);
        }
    }
}
";
    assert_eq!(mask_timestamps(&artifact.text), expected);
    let on_disk = std::fs::read_to_string(&artifact.path).expect("read artifact");
    assert_eq!(on_disk, artifact.text);
}

#[rstest]
fn regeneration_is_idempotent_apart_from_the_stamp(project: Project, scene: Scene) {
    let (mut target, _) = collected(&project.settings, &scene);
    let mut orchestrator = Orchestrator::new(&project.settings);
    let stamp = Timestamp::fixed("2024-01-02 03:04:05.06");
    let first = orchestrator
        .generate(&mut target, &scene, ArtifactSelection::All, &stamp, &mut NeverOverwrite)
        .expect("first generation");
    let second = orchestrator
        .generate(&mut target, &scene, ArtifactSelection::All, &stamp, &mut AlwaysOverwrite)
        .expect("confirmed regeneration");
    assert_eq!(first.artifacts, second.artifacts);

    let err = orchestrator
        .generate(&mut target, &scene, ArtifactSelection::All, &stamp, &mut NeverOverwrite)
        .expect_err("unconfirmed regeneration");
    assert!(matches!(err, CollectionError::FileExists(_)));
}

#[rstest]
fn add_mode_unions_with_stored_entries(project: Project, mut scene: Scene) {
    let (mut target, _) = collected(&project.settings, &scene);
    let content = scene.find(&NodePath::from(vec![2])).expect("content node");
    scene.add_child(content, "Button_Login", ["Button"]);

    Orchestrator::new(&project.settings)
        .collect(&mut target, &scene, CollectMode::Add)
        .expect("add collect");

    assert_eq!(
        field_names(&target),
        [
            "m_TitleText",
            "m_OkImage",
            "m_OkButton",
            "m_AvatarImg",
            "m_HintText",
            "m_LoginButton"
        ]
    );
}

struct Image;

impl ComponentKind for Image {
    const TYPE_NAME: &'static str = "Image";
}

#[rstest]
fn runtime_collection_matches_generated_indices(project: Project, mut scene: Scene) {
    let (target, _) = collected(&project.settings, &scene);
    let components = target.runtime_collection();

    let avatar = components.get::<Image>(&scene, 3).expect("avatar image");
    assert_eq!(avatar.node, "Img_Avatar");
    assert!(components.get::<Image>(&scene, 5).is_none());
    assert!(components.get::<Image>(&scene, 0).is_none());
    assert!(components.get_component(&scene, 0, "Graphic").is_some());

    assert!(scene.rename_node(&NodePath::from(vec![2, 0]), "Avatar"));
    assert!(components.get::<Image>(&scene, 3).is_none());
}

#[rstest]
fn extension_wraps_distinct_types(project: Project) {
    let report = Orchestrator::new(&project.settings)
        .generate_extension(&Timestamp::fixed("t"), &mut NeverOverwrite)
        .expect("generate extension");
    let artifact = report.artifacts.first().expect("extension artifact");
    assert_eq!(artifact.path.file_name(), Some("ComponentCollectionExtension.cs"));
    for type_name in ["Text", "Image", "Button"] {
        assert_eq!(
            artifact
                .text
                .matches(&format!("public static {type_name} Get{type_name}("))
                .count(),
            1
        );
    }
    assert!(artifact.text.contains("return componentCollection.GetComponent<Button>(index);\n        }\n    }\n}"));
}
