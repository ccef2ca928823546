use crate::color::ColorOverride;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DOCUMENT_TYPE: &str = "enhancedtreemap";

pub(crate) fn json_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_i64().map(|n| n as f64))
        .or_else(|| v.as_u64().map(|n| n as f64))
}

/// Deserializes an optional number, treating any non-numeric JSON value as absent.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(json_f64))
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.as_ref().and_then(Value::as_bool))
}

fn lenient_color<'de, D>(deserializer: D) -> std::result::Result<Option<ColorOverride>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(v.and_then(|v| ColorOverride::deserialize(v).ok()))
}

/// One node of the input tree.
///
/// Style attributes are optional overrides; anything missing falls back to the document
/// settings. Attributes that do not parse are treated as missing rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: Option<f64>,
    #[serde(default)]
    pub children: Option<Vec<TreeNode>>,
    #[serde(default, deserialize_with = "lenient_color")]
    pub fill: Option<ColorOverride>,
    #[serde(default, deserialize_with = "lenient_color")]
    pub border_color: Option<ColorOverride>,
    #[serde(default, deserialize_with = "lenient_color")]
    pub text_color: Option<ColorOverride>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub shading: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub shadow: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub text_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub text_padding: Option<f64>,
    #[serde(default)]
    pub halign: Option<String>,
    #[serde(default)]
    pub valign: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            name: name.into(),
            value,
            ..Self::default()
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
            ..Self::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// A parsed treemap code block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Ordered settings blocks; validated lazily by the settings cascade.
    #[serde(default)]
    pub settings: Vec<Value>,
    #[serde(flatten)]
    pub root: TreeNode,
}

impl Document {
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(mut value: Value) -> Result<Self> {
        let Some(obj) = value.as_object_mut() else {
            return Err(Error::InvalidDocument {
                message: "the treemap document must be a JSON object".to_string(),
            });
        };
        match obj.get("settings") {
            Some(Value::Null) => {
                obj.remove("settings");
            }
            Some(Value::Array(_)) | None => {}
            Some(_) => {
                return Err(Error::InvalidDocument {
                    message: "settings must be an array of settings objects".to_string(),
                });
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}
