//! Type tree and JSON ABI entry definitions

use serde::{Deserialize, Serialize};

use crate::AbiError;

/// A node in a parsed ABI type tree.
///
/// The shape mirrors the contract-ABI JSON schema: a raw type token
/// (`"uint256"`, `"tuple[]"`, ...) plus, for tuples, the ordered component
/// list. Trees are built once, by the [signature parser](crate::parse) or
/// straight from ABI JSON, and never mutated; the encoder and decoder only
/// borrow them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    /// Optional field name (empty for anonymous or array-element types)
    #[serde(default)]
    pub name: String,
    /// Raw type token, e.g. `"address"`, `"uint256"`, `"tuple[5]"`
    #[serde(rename = "type")]
    pub ty: String,
    /// Ordered components, present only for `tuple*` types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<DataItem>,
}

impl DataItem {
    /// Create an anonymous item from a type token
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            ty: ty.into(),
            components: Vec::new(),
        }
    }

    /// Create a named item from a type token
    pub fn named(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            components: Vec::new(),
        }
    }

    /// Create a tuple item from its components
    pub fn tuple(components: Vec<DataItem>) -> Self {
        Self {
            name: String::new(),
            ty: "tuple".to_string(),
            components,
        }
    }

    /// True if the type token is `tuple` or an array of tuple
    pub fn is_tuple(&self) -> bool {
        self.ty == "tuple" || self.ty.starts_with("tuple[")
    }

    /// Check the tuple/components invariant on this node and all children:
    /// a `tuple*` item must have components, a non-tuple item must not.
    pub fn validate(&self) -> Result<(), AbiError> {
        if self.is_tuple() && self.components.is_empty() {
            return Err(AbiError::MalformedSignature(format!(
                "tuple type `{}` has no components",
                self.ty
            )));
        }
        if !self.is_tuple() && !self.components.is_empty() {
            return Err(AbiError::MalformedSignature(format!(
                "non-tuple type `{}` has components",
                self.ty
            )));
        }
        for component in &self.components {
            component.validate()?;
        }
        Ok(())
    }

    /// Render the canonical type token, expanding `tuple` into a
    /// parenthesized component list: `tuple[2]` over `(address, uint256)`
    /// becomes `"(address,uint256)[2]"`. Canonical tokens are what selector
    /// hashing operates on.
    pub fn canonical_type(&self) -> String {
        if self.is_tuple() {
            let inner = self
                .components
                .iter()
                .map(DataItem::canonical_type)
                .collect::<Vec<_>>()
                .join(",");
            let suffix = &self.ty["tuple".len()..];
            format!("({inner}){suffix}")
        } else {
            self.ty.clone()
        }
    }
}

/// Render the canonical signature `name(t1,t2,...)` for a parameter list,
/// the exact string selector and topic hashes are computed over.
pub fn canonical_signature(name: &str, params: &[DataItem]) -> String {
    let inner = params
        .iter()
        .map(DataItem::canonical_type)
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}({inner})")
}

/// A single input or output parameter of a JSON ABI entry.
///
/// Identical to [`DataItem`] plus the `indexed` flag events carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// The parameter's type tree
    #[serde(flatten)]
    pub item: DataItem,
    /// True for indexed event parameters (delivered via log topics)
    #[serde(default)]
    pub indexed: bool,
}

/// One entry of a contract ABI, as found in compiler JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    /// Entry name (empty for constructor/fallback entries)
    #[serde(default)]
    pub name: String,
    /// Entry kind: `"function"`, `"event"`, `"constructor"`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Output parameters (functions only)
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    /// True for anonymous events
    #[serde(default)]
    pub anonymous: bool,
}

impl AbiEntry {
    /// Input parameters as a plain [`DataItem`] list
    pub fn input_items(&self) -> Vec<DataItem> {
        self.inputs.iter().map(|p| p.item.clone()).collect()
    }

    /// Output parameters as a plain [`DataItem`] list
    pub fn output_items(&self) -> Vec<DataItem> {
        self.outputs.iter().map(|p| p.item.clone()).collect()
    }

    /// Canonical signature of this entry, e.g. `"transfer(address,uint256)"`
    pub fn canonical_signature(&self) -> String {
        canonical_signature(&self.name, &self.input_items())
    }
}

/// Parse a JSON contract ABI (an array of entries)
pub fn parse_abi_json(json: &str) -> Result<Vec<AbiEntry>, AbiError> {
    Ok(serde_json::from_str(json)?)
}
