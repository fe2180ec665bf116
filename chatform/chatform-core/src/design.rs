//! Form designs: the ordered element sequence attached to a form.
//! Elements are either display-only bubbles or typed inputs; the wire
//! shape carries both kinds as optional fields, so deserialization
//! goes through a raw struct that enforces exactly one kind and a
//! non-empty element id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BubbleKind {
    BubbleText,
    BubbleImage,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InputKind {
    InputText,
    InputNumber,
    InputEmail,
    InputPhone,
    InputDate,
    InputRating,
    InputButton,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Bubble(BubbleKind),
    Input(InputKind),
}

/// One segment of a conversational form. `id` is caller-supplied and
/// must be unique within the design; see [`FormDesign::new`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawElement", into = "RawElement")]
pub struct Element {
    pub id: String,
    pub content: Option<String>,
    pub kind: ElementKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bubble: Option<BubbleKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_type: Option<InputKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl TryFrom<RawElement> for Element {
    type Error = CoreError;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        let kind = match (raw.bubble, raw.input_type) {
            (Some(bubble), None) => ElementKind::Bubble(bubble),
            (None, Some(input)) => ElementKind::Input(input),
            _ => {
                return Err(CoreError::InvalidArgument(
                    "Each element must have either bubble or inputType.".to_string(),
                ))
            }
        };
        if raw.id.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "Each element must have a non-empty id.".to_string(),
            ));
        }
        Ok(Element {
            id: raw.id,
            content: raw.content,
            kind,
        })
    }
}

impl From<Element> for RawElement {
    fn from(element: Element) -> Self {
        let (bubble, input_type) = match element.kind {
            ElementKind::Bubble(bubble) => (Some(bubble), None),
            ElementKind::Input(input) => (None, Some(input)),
        };
        RawElement {
            id: element.id,
            bubble,
            input_type,
            content: element.content,
        }
    }
}

/// The design document attached to a form, one per form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDesign {
    pub id: Uuid,
    pub form_id: Uuid,
    pub name: String,
    pub elements: Vec<Element>,
}

impl FormDesign {
    pub fn new(form_id: Uuid, name: String, elements: Vec<Element>) -> CoreResult<Self> {
        if name.is_empty() || elements.is_empty() {
            return Err(CoreError::InvalidArgument(
                "Invalid form data. formId, name, and elements are required.".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for element in &elements {
            if !seen.insert(element.id.as_str()) {
                return Err(CoreError::InvalidArgument(format!(
                    "Duplicate element id \"{}\" in form design.",
                    element.id
                )));
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            form_id,
            name,
            elements,
        })
    }
}
