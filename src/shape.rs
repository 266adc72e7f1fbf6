//! Blueprint shape classification.
//!
//! Four document layouts are accepted:
//!
//! ```text
//! HeaderAndStream   title: T          StreamOnly   - prompt: Q1
//!                   ---                            ---
//!                   - prompt: Q1                   prompt: Q2
//!
//! PromptsKey        title: T          SingleArray  - prompt: Q1
//!                   prompts:                       - prompt: Q2
//!                     - prompt: Q1
//! ```
//!
//! Classification only decides the layout and splices prompt documents into
//! one ordered stream. It does not look inside prompts.

use serde_json::{Map, Value};

use crate::alias::is_prompt_shaped;
use crate::error::BlueprintError;

const AMBIGUOUS_SINGLE_DOCUMENT: &str = "Invalid blueprint structure: a single document must be an array of prompts, or an object with a 'prompts' key.";

const PROMPTS_NOT_A_LIST: &str = "The 'prompts' key must contain a list of prompts.";

/// The layout a blueprint was written in, with its raw parts.
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintShape {
    /// A header document followed by prompt documents.
    HeaderAndStream {
        /// Raw header object.
        header: Map<String, Value>,
        /// Raw prompt entries, spliced in document order.
        prompts: Vec<Value>,
    },
    /// Several documents, all prompts or lists of prompts.
    StreamOnly {
        /// Raw prompt entries, spliced in document order.
        prompts: Vec<Value>,
    },
    /// One object with a `prompts` list; its other keys are the header.
    PromptsKey {
        /// Raw header object (without `prompts`).
        header: Map<String, Value>,
        /// Raw prompt entries.
        prompts: Vec<Value>,
    },
    /// One array of prompts.
    SingleArray {
        /// Raw prompt entries.
        prompts: Vec<Value>,
    },
}

impl BlueprintShape {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HeaderAndStream { .. } => "header_and_stream",
            Self::StreamOnly { .. } => "stream_only",
            Self::PromptsKey { .. } => "prompts_key",
            Self::SingleArray { .. } => "single_array",
        }
    }

    /// Raw header, if the layout has one.
    pub fn header(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::HeaderAndStream { header, .. } | Self::PromptsKey { header, .. } => Some(header),
            Self::StreamOnly { .. } | Self::SingleArray { .. } => None,
        }
    }

    /// Raw prompt entries.
    pub fn prompts(&self) -> &[Value] {
        match self {
            Self::HeaderAndStream { prompts, .. }
            | Self::StreamOnly { prompts }
            | Self::PromptsKey { prompts, .. }
            | Self::SingleArray { prompts } => prompts,
        }
    }

    /// Split into raw header and raw prompts.
    pub fn into_parts(self) -> (Option<Map<String, Value>>, Vec<Value>) {
        match self {
            Self::HeaderAndStream { header, prompts } | Self::PromptsKey { header, prompts } => {
                (Some(header), prompts)
            }
            Self::StreamOnly { prompts } | Self::SingleArray { prompts } => (None, prompts),
        }
    }
}

/// Decide which layout `documents` were written in.
///
/// `documents` must be non-empty (the reader already rejects empty input).
pub fn classify(mut documents: Vec<Value>) -> Result<BlueprintShape, BlueprintError> {
    match documents.len() {
        0 => Err(BlueprintError::Empty),
        1 => classify_single(documents.remove(0)),
        _ => classify_stream(documents),
    }
}

fn classify_single(document: Value) -> Result<BlueprintShape, BlueprintError> {
    match document {
        Value::Array(prompts) => Ok(BlueprintShape::SingleArray { prompts }),
        Value::Object(mut header) => match header.remove("prompts") {
            Some(Value::Array(prompts)) => Ok(BlueprintShape::PromptsKey { header, prompts }),
            Some(_) => Err(BlueprintError::Structure(PROMPTS_NOT_A_LIST.to_string())),
            None => Err(BlueprintError::Structure(AMBIGUOUS_SINGLE_DOCUMENT.to_string())),
        },
        _ => Err(BlueprintError::Structure(AMBIGUOUS_SINGLE_DOCUMENT.to_string())),
    }
}

fn classify_stream(documents: Vec<Value>) -> Result<BlueprintShape, BlueprintError> {
    let mut documents = documents.into_iter().enumerate().peekable();

    let header = match documents.peek() {
        Some((_, Value::Object(first))) if !is_prompt_shaped(first) => {
            if first.contains_key("prompts") {
                return Err(BlueprintError::Structure(
                    "A header document followed by prompt documents cannot also have a 'prompts' key."
                        .to_string(),
                ));
            }
            match documents.next() {
                Some((_, Value::Object(header))) => Some(header),
                _ => None,
            }
        }
        _ => None,
    };

    let mut prompts = Vec::new();
    for (index, document) in documents {
        match document {
            Value::Object(_) => prompts.push(document),
            Value::Array(items) => prompts.extend(items),
            _ => {
                return Err(BlueprintError::Structure(format!(
                    "Document {} must be a prompt object or a list of prompts.",
                    index + 1
                )))
            }
        }
    }

    Ok(match header {
        Some(header) => BlueprintShape::HeaderAndStream { header, prompts },
        None => BlueprintShape::StreamOnly { prompts },
    })
}
