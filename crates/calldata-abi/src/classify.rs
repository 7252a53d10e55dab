//! Type classification
//!
//! Decides whether a type is static (fixed-width, inlined into the head
//! region) or dynamic (variable-width, reached through a pointer slot), and
//! computes static widths. Classification is a pure function of the type
//! tree; values never enter into it.

use crate::{AbiError, DataItem};

/// An elementary (non-composite) ABI type, resolved from its raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ElementaryType {
    /// `address`
    Address,
    /// `uintN`, 8 <= N <= 256, N % 8 == 0
    Uint(usize),
    /// `intN`, same width rule
    Int(usize),
    /// `bool`
    Bool,
    /// `bytesN`, 1 <= N <= 32
    FixedBytes(usize),
    /// `bytes`
    Bytes,
    /// `string`
    String,
}

/// Resolve an elementary type token. `uint`/`int` without a width default
/// to 256 bits.
pub(crate) fn parse_elementary(ty: &str) -> Result<ElementaryType, AbiError> {
    match ty {
        "address" => return Ok(ElementaryType::Address),
        "bool" => return Ok(ElementaryType::Bool),
        "string" => return Ok(ElementaryType::String),
        "bytes" => return Ok(ElementaryType::Bytes),
        _ => {}
    }

    if let Some(rest) = ty.strip_prefix("uint") {
        let bits = parse_bits(ty, rest)?;
        return Ok(ElementaryType::Uint(bits));
    }
    if let Some(rest) = ty.strip_prefix("int") {
        let bits = parse_bits(ty, rest)?;
        return Ok(ElementaryType::Int(bits));
    }
    if let Some(rest) = ty.strip_prefix("bytes") {
        let size: usize = rest
            .parse()
            .map_err(|_| AbiError::UnsupportedType(ty.to_string()))?;
        if size == 0 || size > 32 {
            return Err(AbiError::UnsupportedType(ty.to_string()));
        }
        return Ok(ElementaryType::FixedBytes(size));
    }

    Err(AbiError::UnsupportedType(ty.to_string()))
}

fn parse_bits(ty: &str, rest: &str) -> Result<usize, AbiError> {
    if rest.is_empty() {
        return Ok(256);
    }
    let bits: usize = rest
        .parse()
        .map_err(|_| AbiError::UnsupportedType(ty.to_string()))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::UnsupportedType(ty.to_string()));
    }
    Ok(bits)
}

/// Peel the outermost array suffix off a type token.
///
/// `"uint256[3][]"` yields `Some(("uint256[3]", None))`: the token is a
/// dynamic array whose element type is `uint256[3]`. Returns `None` for
/// tokens with no array suffix.
pub(crate) fn peel_array(ty: &str) -> Result<Option<(&str, Option<usize>)>, AbiError> {
    if !ty.ends_with(']') {
        return Ok(None);
    }
    let open = ty
        .rfind('[')
        .ok_or_else(|| AbiError::UnsupportedType(ty.to_string()))?;
    let inner = &ty[..open];
    if inner.is_empty() {
        return Err(AbiError::UnsupportedType(ty.to_string()));
    }
    let dim = &ty[open + 1..ty.len() - 1];
    if dim.is_empty() {
        return Ok(Some((inner, None)));
    }
    let n: usize = dim
        .parse()
        .map_err(|_| AbiError::UnsupportedType(ty.to_string()))?;
    Ok(Some((inner, Some(n))))
}

/// Dynamic-ness over raw parts (type token + components), so array layers
/// can recurse without cloning subtrees.
pub(crate) fn is_dynamic_parts(ty: &str, components: &[DataItem]) -> Result<bool, AbiError> {
    if let Some((inner, dim)) = peel_array(ty)? {
        return match dim {
            None => Ok(true),
            Some(_) => is_dynamic_parts(inner, components),
        };
    }
    if ty == "tuple" {
        if components.is_empty() {
            return Err(AbiError::UnsupportedType(ty.to_string()));
        }
        for component in components {
            if is_dynamic_parts(&component.ty, &component.components)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }
    Ok(matches!(
        parse_elementary(ty)?,
        ElementaryType::Bytes | ElementaryType::String
    ))
}

/// Static width over raw parts; `None` means the type is dynamic.
pub(crate) fn static_width_parts(
    ty: &str,
    components: &[DataItem],
) -> Result<Option<usize>, AbiError> {
    if let Some((inner, dim)) = peel_array(ty)? {
        return match dim {
            None => Ok(None),
            Some(n) => Ok(static_width_parts(inner, components)?.map(|w| n * w)),
        };
    }
    if ty == "tuple" {
        if components.is_empty() {
            return Err(AbiError::UnsupportedType(ty.to_string()));
        }
        let mut sum = 0usize;
        for component in components {
            match static_width_parts(&component.ty, &component.components)? {
                Some(w) => sum += w,
                None => return Ok(None),
            }
        }
        return Ok(Some(sum));
    }
    Ok(match parse_elementary(ty)? {
        ElementaryType::Bytes | ElementaryType::String => None,
        _ => Some(32),
    })
}

/// Width of the slot a child of this type occupies in its parent's head
/// region: its static width when inlined, or one pointer word when dynamic.
pub(crate) fn head_width(ty: &str, components: &[DataItem]) -> Result<usize, AbiError> {
    Ok(static_width_parts(ty, components)?.unwrap_or(32))
}

/// True if the type has a fixed encoded width (no length prefix, no
/// pointer indirection anywhere beneath it).
pub fn is_static(item: &DataItem) -> Result<bool, AbiError> {
    Ok(!is_dynamic_parts(&item.ty, &item.components)?)
}

/// The encoded width in bytes of a static type, `None` for dynamic types.
pub fn static_width(item: &DataItem) -> Result<Option<usize>, AbiError> {
    static_width_parts(&item.ty, &item.components)
}
