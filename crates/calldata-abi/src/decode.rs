//! ABI decoding
//!
//! Mirrors the layout engine in reverse: the head region is read word by
//! word; static members decode in place, dynamic members follow an offset
//! word into the enclosing region's tail. Every read is bounds-checked
//! before indexing; decoding either fully succeeds or fails without
//! producing a partial value tree.

use calldata_primitives::{Address, U256};

use crate::blocks::pad32;
use crate::classify::{self, ElementaryType};
use crate::token::I256;
use crate::{AbiError, DataItem, Token};

/// Decode of a function's return buffer.
///
/// A zero-length buffer against an empty output list is the distinct
/// [`ReturnData::None`] success, not an error: the function simply has no
/// return value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnData {
    /// The function declares no outputs and none were returned
    None,
    /// Decoded output values
    Values(Vec<Token>),
}

/// Decode a parameter list out of an encoded buffer.
pub fn decode_params(items: &[DataItem], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    let (tokens, _) = decode_params_consumed(items, data)?;
    Ok(tokens)
}

/// Decode a function return buffer, distinguishing "no return value".
pub fn decode_return(items: &[DataItem], data: &[u8]) -> Result<ReturnData, AbiError> {
    if items.is_empty() && data.is_empty() {
        return Ok(ReturnData::None);
    }
    Ok(ReturnData::Values(decode_params(items, data)?))
}

/// Decode a parameter list and report how many bytes of the buffer the
/// encoding spans (counting tail padding). Selector dispatch uses the span
/// to require exact consumption.
pub(crate) fn decode_params_consumed(
    items: &[DataItem],
    data: &[u8],
) -> Result<(Vec<Token>, usize), AbiError> {
    let mut reader = Reader::new(data);
    let mut tokens = Vec::with_capacity(items.len());
    let mut pos = 0usize;
    for item in items {
        let (token, used) = decode_member(&mut reader, &item.ty, &item.components, 0, pos)?;
        tokens.push(token);
        pos += used;
    }
    Ok((tokens, reader.watermark))
}

/// Bounds-checked view over the buffer, tracking the furthest byte any
/// read (or its padding) has touched.
struct Reader<'a> {
    data: &'a [u8],
    watermark: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, watermark: 0 }
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn word(&mut self, at: usize) -> Result<&'a [u8], AbiError> {
        self.bytes(at, 32)
    }

    fn bytes(&mut self, at: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = at.checked_add(len).ok_or(AbiError::InvalidOffset {
            offset: at,
            len: self.data.len(),
        })?;
        if end > self.data.len() {
            return Err(AbiError::InsufficientData {
                needed: end,
                available: self.data.len(),
            });
        }
        self.watermark = self.watermark.max(end);
        Ok(&self.data[at..end])
    }

    /// Extend the watermark over padding that a canonical encoder would
    /// have written, without requiring those bytes to be present.
    fn mark_padding(&mut self, end: usize) {
        self.watermark = self.watermark.max(end);
    }
}

/// Interpret a pointer word as an in-buffer offset.
fn word_to_usize(word: &[u8], buf_len: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(word);
    if value > U256::from(buf_len) {
        let offset = if value.bits() <= 64 {
            value.low_u64() as usize
        } else {
            usize::MAX
        };
        return Err(AbiError::InvalidOffset {
            offset,
            len: buf_len,
        });
    }
    Ok(value.low_u64() as usize)
}

/// Decode one tuple member or parameter from its head slot at
/// `base + pos`, following the pointer when the type is dynamic. Returns
/// the token and the head bytes consumed.
fn decode_member(
    reader: &mut Reader<'_>,
    ty: &str,
    components: &[DataItem],
    base: usize,
    pos: usize,
) -> Result<(Token, usize), AbiError> {
    if classify::is_dynamic_parts(ty, components)? {
        let word = reader.word(base + pos)?;
        let offset = word_to_usize(word, reader.len())?;
        let target = base.checked_add(offset).ok_or(AbiError::InvalidOffset {
            offset,
            len: reader.len(),
        })?;
        if target > reader.len() {
            return Err(AbiError::InvalidOffset {
                offset,
                len: reader.len(),
            });
        }
        let token = decode_dynamic(reader, ty, components, target)?;
        Ok((token, 32))
    } else {
        decode_static(reader, ty, components, base, pos)
    }
}

/// Decode a dynamic value whose own region starts at absolute `at`.
fn decode_dynamic(
    reader: &mut Reader<'_>,
    ty: &str,
    components: &[DataItem],
    at: usize,
) -> Result<Token, AbiError> {
    if let Some((inner, dim)) = classify::peel_array(ty)? {
        return match dim {
            None => {
                // length word, then elements laid out as a synthetic tuple
                // based just past it
                let count_word = U256::from_big_endian(reader.word(at)?);
                let elems_base = at + 32;
                // each element occupies at least one head word; a count the
                // remaining buffer cannot hold fails before any allocation
                let slots = (reader.len() - elems_base) / 32;
                if count_word > U256::from(slots) {
                    let needed = count_word
                        .checked_mul(U256::from(32u64))
                        .and_then(|v| v.checked_add(U256::from(elems_base)))
                        .filter(|v| v.bits() <= 64)
                        .map(|v| v.low_u64() as usize)
                        .unwrap_or(usize::MAX);
                    return Err(AbiError::InsufficientData {
                        needed,
                        available: reader.len(),
                    });
                }
                let count = count_word.low_u64() as usize;
                decode_elements(reader, inner, components, elems_base, count)
                    .map(Token::Array)
            }
            Some(n) => {
                // a fixed array is only decoded here when its elements are
                // dynamic; there is no length word
                decode_elements(reader, inner, components, at, n).map(Token::FixedArray)
            }
        };
    }

    if ty == "tuple" {
        let mut fields = Vec::with_capacity(components.len());
        let mut pos = 0usize;
        for component in components {
            let (token, used) =
                decode_member(reader, &component.ty, &component.components, at, pos)?;
            fields.push(token);
            pos += used;
        }
        return Ok(Token::Tuple(fields));
    }

    match classify::parse_elementary(ty)? {
        ElementaryType::Bytes => decode_byte_payload(reader, at).map(Token::Bytes),
        ElementaryType::String => {
            let raw = decode_byte_payload(reader, at)?;
            let s = String::from_utf8(raw).map_err(|e| AbiError::InvalidUtf8(e.to_string()))?;
            Ok(Token::String(s))
        }
        // static elementary types never reach the dynamic path
        _ => Err(AbiError::UnsupportedType(ty.to_string())),
    }
}

fn decode_elements(
    reader: &mut Reader<'_>,
    inner: &str,
    components: &[DataItem],
    base: usize,
    count: usize,
) -> Result<Vec<Token>, AbiError> {
    let mut elements = Vec::with_capacity(count);
    let mut pos = 0usize;
    for _ in 0..count {
        let (token, used) = decode_member(reader, inner, components, base, pos)?;
        elements.push(token);
        pos += used;
    }
    Ok(elements)
}

/// Length-prefixed byte payload at absolute `at`.
fn decode_byte_payload(reader: &mut Reader<'_>, at: usize) -> Result<Vec<u8>, AbiError> {
    let len_word = U256::from_big_endian(reader.word(at)?);
    let payload_base = at + 32;
    let remaining = reader.len() - payload_base;
    if len_word > U256::from(remaining) {
        let needed = len_word
            .checked_add(U256::from(payload_base))
            .filter(|v| v.bits() <= 64)
            .map(|v| v.low_u64() as usize)
            .unwrap_or(usize::MAX);
        return Err(AbiError::InsufficientData {
            needed,
            available: reader.len(),
        });
    }
    let len = len_word.low_u64() as usize;
    let payload = reader.bytes(payload_base, len)?.to_vec();
    reader.mark_padding(payload_base + pad32(len));
    Ok(payload)
}

/// Decode a static value inlined at `base + pos`. Returns the token and
/// its width.
fn decode_static(
    reader: &mut Reader<'_>,
    ty: &str,
    components: &[DataItem],
    base: usize,
    pos: usize,
) -> Result<(Token, usize), AbiError> {
    if let Some((inner, dim)) = classify::peel_array(ty)? {
        // only fixed arrays of static elements are inlined
        let n = dim.unwrap_or_default();
        let mut elements = Vec::with_capacity(n);
        let mut used = 0usize;
        for _ in 0..n {
            let (token, w) = decode_static(reader, inner, components, base, pos + used)?;
            elements.push(token);
            used += w;
        }
        return Ok((Token::FixedArray(elements), used));
    }

    if ty == "tuple" {
        let mut fields = Vec::with_capacity(components.len());
        let mut used = 0usize;
        for component in components {
            let (token, w) =
                decode_static(reader, &component.ty, &component.components, base, pos + used)?;
            fields.push(token);
            used += w;
        }
        return Ok((Token::Tuple(fields), used));
    }

    let word: &[u8] = reader.word(base + pos)?;
    let token = match classify::parse_elementary(ty)? {
        ElementaryType::Address => {
            let mut w = [0u8; 32];
            w.copy_from_slice(word);
            Token::Address(Address::from_word(&w))
        }
        ElementaryType::Uint(_) => Token::Uint(U256::from_big_endian(word)),
        ElementaryType::Int(_) => Token::Int(int_from_word(word)),
        ElementaryType::Bool => Token::Bool(word[31] != 0),
        ElementaryType::FixedBytes(size) => Token::FixedBytes(word[..size].to_vec()),
        // dynamic types never reach the static path
        ElementaryType::Bytes | ElementaryType::String => {
            return Err(AbiError::UnsupportedType(ty.to_string()));
        }
    };
    Ok((token, 32))
}

/// Read a two's-complement word back into sign-magnitude form.
fn int_from_word(word: &[u8]) -> I256 {
    let negative = word[0] & 0x80 != 0;
    if !negative {
        return I256::new(U256::from_big_endian(word), false);
    }
    let mut flipped = [0u8; 32];
    for (i, byte) in word.iter().enumerate() {
        flipped[i] = !byte;
    }
    let mut carry = 1u16;
    for i in (0..32).rev() {
        let sum = u16::from(flipped[i]) + carry;
        flipped[i] = sum as u8;
        carry = sum >> 8;
    }
    I256::new(U256::from_big_endian(&flipped), true)
}
