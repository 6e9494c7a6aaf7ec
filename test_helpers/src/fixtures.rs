//! Documents shared by integration suites.

/// A login panel scene in TOML form.
///
/// Child paths: `0` is `Text_Title`, `1` is `Image_Button_Ok`, `2` is
/// `Content` whose child `2/0` is `Img_Avatar`, `3` is `Widget_Text_Hint`
/// and `4` is a second `Text_Title`.
pub const LOGIN_SCENE_TOML: &str = r#"
[types]
Image = ["Graphic"]
Text = ["Graphic"]

[root]
name = "LoginPanel"
components = ["RectTransform"]

[[root.children]]
name = "Text_Title"
components = ["RectTransform", "Text"]

[[root.children]]
name = "Image_Button_Ok"
components = ["RectTransform", "Image", "Button"]

[[root.children]]
name = "Content"
components = ["RectTransform"]

[[root.children.children]]
name = "Img_Avatar"
components = ["RectTransform", "Image"]

[[root.children]]
name = "Widget_Text_Hint"
components = ["RectTransform", "Text"]

[[root.children]]
name = "Text_Title"
components = ["RectTransform", "Text"]
"#;

/// The same hierarchy as [`LOGIN_SCENE_TOML`], trimmed, in JSON form.
pub const LOGIN_SCENE_JSON: &str = r#"{
  "root": {
    "name": "LoginPanel",
    "children": [
      { "name": "Text_Title", "components": ["Text"] },
      { "name": "Image_Button_Ok", "components": ["Image", "Button"] }
    ]
  }
}"#;

/// A settings file with a short type table and relative template paths.
pub const SETTINGS_TOML: &str = r#"
namespace = "Demo"
code_save_path = "Generated"

[templates]
components = "templates/Components.txt"
behaviour = "templates/Behaviour.txt"
extension = "templates/Extension.txt"

[[component_maps]]
key = "Text"
type_name = "Text"

[[component_maps]]
key = "Image"
type_name = "Image"

[[component_maps]]
key = "Img"
type_name = "Image"

[[component_maps]]
key = "Button"
type_name = "Button"
"#;

/// A minimal Components template.
pub const COMPONENTS_TEMPLATE: &str = "// __CREATE_TIME__
namespace __NAME_SPACE__
{
    public partial class __CLASS_NAME__
    {
__FIELD__

        private void GetBindComponents(ComponentCollection collection)
        {
__GET_FIELD__
        }
    }
}
";

/// A minimal Behaviour template.
pub const BEHAVIOUR_TEMPLATE: &str = "namespace __NAME_SPACE__
{
    public partial class __CLASS_NAME__ : MonoBehaviour
    {
    }
}
";

/// A minimal Extension template.
pub const EXTENSION_TEMPLATE: &str = "// __CREATE_TIME__
namespace __NAME_SPACE__
{
    public static class ComponentCollectionExtension
    {
__GET_COMPONENT__
    }
}
";
