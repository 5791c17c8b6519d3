//! The per-node payload carried by a diff.

use std::ops::AddAssign;

use edge_core::types::ID_KEY;
use edge_core::{NodeProperties, PropertyValue};
use serde::{Deserialize, Serialize};

use crate::error::DiffError;

/// Field-wise node update. Absent fields leave the server-side value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_label: Option<bool>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Later fields win; fields absent from `other` are kept.
impl AddAssign for NodeUpdate {
    fn add_assign(&mut self, other: NodeUpdate) {
        if other.label.is_some() {
            self.label = other.label;
        }
        if other.size.is_some() {
            self.size = other.size;
        }
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.red.is_some() {
            self.red = other.red;
        }
        if other.green.is_some() {
            self.green = other.green;
        }
        if other.blue.is_some() {
            self.blue = other.blue;
        }
        if other.show_label.is_some() {
            self.show_label = other.show_label;
        }
    }
}

impl TryFrom<&NodeProperties> for NodeUpdate {
    type Error = DiffError;

    /// Keys the codec does not carry are skipped; known keys must have the right type.
    fn try_from(props: &NodeProperties) -> Result<Self, Self::Error> {
        let mut update = NodeUpdate::default();
        for (key, value) in props {
            match key.as_str() {
                "label" => update.label = Some(text(key, value)?),
                "url" => update.url = Some(text(key, value)?),
                "size" => update.size = Some(size(key, value)?),
                "red" => update.red = Some(channel(key, value)?),
                "green" => update.green = Some(channel(key, value)?),
                "blue" => update.blue = Some(channel(key, value)?),
                "show_label" => {
                    update.show_label = Some(value.as_bool().ok_or_else(|| invalid(key, "a boolean"))?)
                }
                ID_KEY => {}
                other => tracing::debug!(key = other, "Property not carried by the diff codec"),
            }
        }
        Ok(update)
    }
}

impl From<&NodeUpdate> for NodeProperties {
    fn from(update: &NodeUpdate) -> Self {
        let mut props = NodeProperties::new();
        if let Some(label) = &update.label {
            props.insert("label", label.as_str());
        }
        if let Some(url) = &update.url {
            props.insert("url", url.as_str());
        }
        if let Some(size) = update.size {
            props.insert("size", size);
        }
        if let Some(red) = update.red {
            props.insert("red", red);
        }
        if let Some(green) = update.green {
            props.insert("green", green);
        }
        if let Some(blue) = update.blue {
            props.insert("blue", blue);
        }
        if let Some(show_label) = update.show_label {
            props.insert("show_label", show_label);
        }
        props
    }
}

fn invalid(key: &str, expected: &'static str) -> DiffError {
    DiffError::InvalidProperty {
        key: key.to_string(),
        expected,
    }
}

fn text(key: &str, value: &PropertyValue) -> Result<String, DiffError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a string"))
}

fn number(key: &str, value: &PropertyValue) -> Result<f64, DiffError> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| invalid(key, "a finite number"))
}

fn size(key: &str, value: &PropertyValue) -> Result<f32, DiffError> {
    let n = number(key, value)? as f32;
    if !n.is_finite() {
        return Err(invalid(key, "a finite f32"));
    }
    Ok(n)
}

fn channel(key: &str, value: &PropertyValue) -> Result<u8, DiffError> {
    let n = number(key, value)?;
    if n.fract() != 0.0 || !(0.0..=255.0).contains(&n) {
        return Err(invalid(key, "an integer in 0..=255"));
    }
    Ok(n as u8)
}
