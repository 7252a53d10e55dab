//! Calldata layout blocks
//!
//! One block per type node (or array element), built fresh for every encode
//! call. Static blocks hold their canonical 32-byte word already encoded;
//! composite blocks hold children; pointer blocks stand in the head region
//! for a dynamic child whose bytes land in the enclosing tail region. The
//! layout engine in [`crate::encode`] consumes the tree.

use calldata_primitives::U256;

use crate::classify::{self, ElementaryType};
use crate::{AbiError, DataItem, Token};

/// Round a byte length up to the next 32-byte boundary.
pub(crate) fn pad32(len: usize) -> usize {
    len.div_ceil(32) * 32
}

/// A node of the layout tree.
#[derive(Debug, Clone)]
pub(crate) enum CalldataBlock {
    /// Terminal fixed-width value, one canonical word
    Static(StaticBlock),
    /// Terminal variable-width payload: length word + padded bytes
    DynamicBytes(DynamicBytesBlock),
    /// Tuple: ordered heterogeneous children
    Set(SetBlock),
    /// Array: homogeneous children, with a length word when dynamic-length
    Array(ArrayBlock),
    /// A head slot to be patched with the offset of its target
    Pointer(PointerBlock),
}

#[derive(Debug, Clone)]
pub(crate) struct StaticBlock {
    pub name: String,
    pub word: [u8; 32],
}

#[derive(Debug, Clone)]
pub(crate) struct DynamicBytesBlock {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct SetBlock {
    pub name: String,
    pub members: Vec<CalldataBlock>,
}

#[derive(Debug, Clone)]
pub(crate) struct ArrayBlock {
    pub name: String,
    /// Element count, present only for dynamic-length arrays (it becomes
    /// the length header word)
    pub len_header: Option<usize>,
    pub members: Vec<CalldataBlock>,
}

#[derive(Debug, Clone)]
pub(crate) struct PointerBlock {
    pub name: String,
    pub target: Box<CalldataBlock>,
}

impl CalldataBlock {
    /// Size of the length-prefix header, zero for headerless blocks.
    pub(crate) fn header_size(&self) -> usize {
        match self {
            CalldataBlock::DynamicBytes(_) => 32,
            CalldataBlock::Array(a) if a.len_header.is_some() => 32,
            _ => 0,
        }
    }

    /// Size of everything after the header.
    pub(crate) fn body_size(&self) -> usize {
        self.total_size() - self.header_size()
    }

    /// Full encoded size of this block, including the sizes of pointed-to
    /// targets beneath it.
    pub(crate) fn total_size(&self) -> usize {
        match self {
            CalldataBlock::Static(_) => 32,
            CalldataBlock::DynamicBytes(b) => 32 + pad32(b.data.len()),
            CalldataBlock::Set(s) => s.members.iter().map(CalldataBlock::total_size).sum(),
            CalldataBlock::Array(a) => {
                self.header_size()
                    + a.members
                        .iter()
                        .map(CalldataBlock::total_size)
                        .sum::<usize>()
            }
            CalldataBlock::Pointer(p) => 32 + p.target.total_size(),
        }
    }

    /// True for blocks whose final byte position depends on dynamic-region
    /// layout, i.e. blocks that get placed in a tail region and referenced
    /// through a pointer slot.
    pub(crate) fn is_relocatable(&self) -> bool {
        match self {
            CalldataBlock::Static(_) | CalldataBlock::Pointer(_) => false,
            CalldataBlock::DynamicBytes(_) => true,
            CalldataBlock::Set(s) => s
                .members
                .iter()
                .any(|m| matches!(m, CalldataBlock::Pointer(_))),
            CalldataBlock::Array(a) => {
                a.len_header.is_some()
                    || a.members
                        .iter()
                        .any(|m| matches!(m, CalldataBlock::Pointer(_)))
            }
        }
    }

    /// Diagnostic name, from the originating type node.
    #[allow(dead_code)]
    pub(crate) fn name(&self) -> &str {
        match self {
            CalldataBlock::Static(b) => &b.name,
            CalldataBlock::DynamicBytes(b) => &b.name,
            CalldataBlock::Set(b) => &b.name,
            CalldataBlock::Array(b) => &b.name,
            CalldataBlock::Pointer(b) => &b.name,
        }
    }
}

/// Build the root block for a parameter list: a tuple over the parameters.
pub(crate) fn build_root(items: &[DataItem], tokens: &[Token]) -> Result<CalldataBlock, AbiError> {
    if items.len() != tokens.len() {
        return Err(AbiError::ValueTypeMismatch {
            expected: format!("{} parameters", items.len()),
            got: format!("{} values", tokens.len()),
        });
    }
    let mut members = Vec::with_capacity(items.len());
    for (item, token) in items.iter().zip(tokens.iter()) {
        members.push(build_member(item, token)?);
    }
    Ok(CalldataBlock::Set(SetBlock {
        name: String::new(),
        members,
    }))
}

/// Build the block for one tuple member or parameter, wrapping dynamic
/// children in a pointer slot.
fn build_member(item: &DataItem, token: &Token) -> Result<CalldataBlock, AbiError> {
    let block = build_block(&item.name, &item.ty, &item.components, token)?;
    wrap_if_dynamic(&item.name, &item.ty, &item.components, block)
}

fn wrap_if_dynamic(
    name: &str,
    ty: &str,
    components: &[DataItem],
    block: CalldataBlock,
) -> Result<CalldataBlock, AbiError> {
    if classify::is_dynamic_parts(ty, components)? {
        Ok(CalldataBlock::Pointer(PointerBlock {
            name: name.to_string(),
            target: Box::new(block),
        }))
    } else {
        Ok(block)
    }
}

/// Build the block for a single (type, value) pair.
pub(crate) fn build_block(
    name: &str,
    ty: &str,
    components: &[DataItem],
    token: &Token,
) -> Result<CalldataBlock, AbiError> {
    // array layers first: `uint256[3][]` is an array of `uint256[3]`
    if let Some((inner, dim)) = classify::peel_array(ty)? {
        let elements = match (dim, token) {
            (None, Token::Array(elements)) => elements,
            (Some(_), Token::FixedArray(elements)) => elements,
            _ => {
                return Err(AbiError::ValueTypeMismatch {
                    expected: ty.to_string(),
                    got: token.shape().to_string(),
                });
            }
        };
        if let Some(n) = dim {
            if elements.len() != n {
                return Err(AbiError::ArrayLengthMismatch {
                    expected: n,
                    got: elements.len(),
                });
            }
        }

        let elem_dynamic = classify::is_dynamic_parts(inner, components)?;
        let mut members = Vec::with_capacity(elements.len());
        for element in elements {
            let block = build_block(name, inner, components, element)?;
            members.push(if elem_dynamic {
                CalldataBlock::Pointer(PointerBlock {
                    name: name.to_string(),
                    target: Box::new(block),
                })
            } else {
                block
            });
        }
        return Ok(CalldataBlock::Array(ArrayBlock {
            name: name.to_string(),
            len_header: dim.is_none().then_some(elements.len()),
            members,
        }));
    }

    if ty == "tuple" {
        let fields = match token {
            Token::Tuple(fields) => fields,
            _ => {
                return Err(AbiError::ValueTypeMismatch {
                    expected: "tuple".to_string(),
                    got: token.shape().to_string(),
                });
            }
        };
        if fields.len() != components.len() {
            return Err(AbiError::ValueTypeMismatch {
                expected: format!("tuple of {} components", components.len()),
                got: format!("tuple of {} values", fields.len()),
            });
        }
        let mut members = Vec::with_capacity(fields.len());
        for (component, field) in components.iter().zip(fields.iter()) {
            members.push(build_member(component, field)?);
        }
        return Ok(CalldataBlock::Set(SetBlock {
            name: name.to_string(),
            members,
        }));
    }

    build_elementary(name, ty, token)
}

/// Encode an elementary value into its terminal block.
fn build_elementary(name: &str, ty: &str, token: &Token) -> Result<CalldataBlock, AbiError> {
    let elementary = classify::parse_elementary(ty)?;
    let word = match (elementary, token) {
        (ElementaryType::Address, Token::Address(addr)) => addr.into_word(),
        (ElementaryType::Uint(bits), Token::Uint(value)) => {
            if bits < 256 && *value >> bits != U256::zero() {
                return Err(AbiError::ValueOutOfRange {
                    ty: ty.to_string(),
                    value: value.to_string(),
                });
            }
            u256_word(value)
        }
        (ElementaryType::Int(bits), Token::Int(value)) => {
            // magnitude limit: 2^(bits-1) on the negative side,
            // 2^(bits-1) - 1 on the positive side
            let limit = U256::one() << (bits - 1);
            let in_range = if value.negative {
                value.abs <= limit
            } else {
                value.abs < limit
            };
            if !in_range {
                return Err(AbiError::ValueOutOfRange {
                    ty: ty.to_string(),
                    value: value.to_string(),
                });
            }
            if value.negative {
                twos_complement(&value.abs)
            } else {
                u256_word(&value.abs)
            }
        }
        (ElementaryType::Bool, Token::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            word
        }
        (ElementaryType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() != size {
                return Err(AbiError::ValueOutOfRange {
                    ty: ty.to_string(),
                    value: format!("{} bytes", data.len()),
                });
            }
            let mut word = [0u8; 32];
            word[..size].copy_from_slice(data);
            word
        }
        (ElementaryType::Bytes, Token::Bytes(data)) => {
            return Ok(CalldataBlock::DynamicBytes(DynamicBytesBlock {
                name: name.to_string(),
                data: data.clone(),
            }));
        }
        (ElementaryType::String, Token::String(s)) => {
            return Ok(CalldataBlock::DynamicBytes(DynamicBytesBlock {
                name: name.to_string(),
                data: s.as_bytes().to_vec(),
            }));
        }
        _ => {
            return Err(AbiError::ValueTypeMismatch {
                expected: ty.to_string(),
                got: token.shape().to_string(),
            });
        }
    };
    Ok(CalldataBlock::Static(StaticBlock {
        name: name.to_string(),
        word,
    }))
}

/// Big-endian 32-byte word of an unsigned value.
pub(crate) fn u256_word(value: &U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Two's-complement word of a negative value given its magnitude.
fn twos_complement(abs: &U256) -> [u8; 32] {
    let mut word = u256_word(abs);
    for byte in word.iter_mut() {
        *byte = !*byte;
    }
    let mut carry = 1u16;
    for i in (0..32).rev() {
        let sum = u16::from(word[i]) + carry;
        word[i] = sum as u8;
        carry = sum >> 8;
    }
    word
}
