//! Type signature parser
//!
//! Turns a human-readable type signature such as `"(address,uint256[])[3]"`
//! into a [`DataItem`] tree. The scan is a single left-to-right pass over the
//! characters, with an explicit stack of open tuple scopes; the resulting
//! tree has no parent references.

use crate::{AbiError, DataItem};

/// Parser behavior switches.
#[derive(Debug, Clone, Copy)]
pub struct ParserConfig {
    /// How a space inside a token is treated.
    ///
    /// With `true` (default) a token is read Solidity-style as `type name`:
    /// `"(address owner)"` yields a field named `owner` of type `address`,
    /// and in `"address indexed from"` the last word wins as the name.
    /// With `false` spaces are discarded and all fields stay anonymous.
    pub named_fields: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { named_fields: true }
    }
}

/// Parse a type signature with the default [`ParserConfig`].
pub fn parse(signature: &str) -> Result<DataItem, AbiError> {
    parse_with(signature, ParserConfig::default())
}

/// Parse a type signature with an explicit [`ParserConfig`].
pub fn parse_with(signature: &str, config: ParserConfig) -> Result<DataItem, AbiError> {
    if signature.is_empty() {
        return Err(AbiError::EmptySignature);
    }

    // The node currently being accumulated. Open tuple scopes live on the
    // stack; a scope's own token buffer resumes accumulating (array suffix,
    // field name) once its closing `)` is consumed.
    let mut current = NodeBuf::default();
    let mut stack: Vec<Scope> = Vec::new();

    for ch in signature.chars() {
        match ch {
            '(' => {
                if !current.ty.is_empty() || current.tuple {
                    return Err(AbiError::MalformedSignature(format!(
                        "unexpected `(` after `{}`",
                        current.ty
                    )));
                }
                stack.push(Scope {
                    node: current,
                    children: Vec::new(),
                });
                current = NodeBuf::default();
            }
            ',' => {
                let child = current.finish()?;
                match stack.last_mut() {
                    Some(scope) => scope.children.push(child),
                    None => {
                        return Err(AbiError::MalformedSignature(
                            "`,` outside of a tuple".to_string(),
                        ));
                    }
                }
                current = NodeBuf::default();
            }
            ')' => {
                let child = current.finish()?;
                let mut scope = stack.pop().ok_or_else(|| {
                    AbiError::MalformedSignature("`)` with no open tuple".to_string())
                })?;
                scope.children.push(child);
                current = scope.node;
                current.tuple = true;
                current.ty.push_str("tuple");
                current.components = scope.children;
            }
            ' ' => {
                if !config.named_fields {
                    continue;
                }
                if current.ty.is_empty() && !current.in_name {
                    // leading whitespace, e.g. after a comma
                    continue;
                }
                current.in_name = true;
                current.name.clear();
            }
            _ => {
                if current.in_name {
                    current.name.push(ch);
                } else {
                    current.ty.push(ch);
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(AbiError::MalformedSignature(
            "unclosed tuple in signature".to_string(),
        ));
    }

    let root = current.finish()?;
    root.validate()?;
    Ok(root)
}

/// An open tuple scope: the tuple's own partially-read token plus the
/// children completed so far.
struct Scope {
    node: NodeBuf,
    children: Vec<DataItem>,
}

#[derive(Default)]
struct NodeBuf {
    name: String,
    ty: String,
    components: Vec<DataItem>,
    tuple: bool,
    in_name: bool,
}

impl NodeBuf {
    fn finish(self) -> Result<DataItem, AbiError> {
        if self.ty.is_empty() {
            return Err(AbiError::MalformedSignature(
                "empty type token".to_string(),
            ));
        }
        Ok(DataItem {
            name: self.name,
            ty: self.ty,
            components: self.components,
        })
    }
}
