//! ABI encoding: the layout engine
//!
//! Encoding runs in two phases. Phase one builds the block tree
//! ([`crate::blocks`]), which fixes every block's size. Phase two serializes
//! the tree region by region: each tuple or array writes its head slots in
//! declared order (static children inline, dynamic children as a zeroed
//! pointer slot), then appends the pointed-to blocks to the trailing tail
//! region, recording a `(slot, offset)` patch for every pointer. The patches
//! are applied to the flat buffer last, so no block is ever mutated after
//! construction.
//!
//! Pointer offsets are relative to the start of the enclosing region's head
//! (the "own base" convention), not to the start of the whole buffer.

use calldata_primitives::{SELECTOR_LEN, U256};

use crate::blocks::{self, CalldataBlock};
use crate::{AbiError, DataItem, Token};

/// Encode a parameter list against its type list.
///
/// The returned buffer is the standard tuple encoding of the values; it is
/// exactly what follows the 4-byte selector in a contract call.
pub fn encode_params(items: &[DataItem], values: &[Token]) -> Result<Vec<u8>, AbiError> {
    let root = blocks::build_root(items, values)?;
    Ok(serialize(&root))
}

/// Encode a full method call: selector header followed by the argument
/// tuple. The selector sits outside the 32-byte word grid.
pub fn encode_function_call(
    selector: [u8; SELECTOR_LEN],
    items: &[DataItem],
    values: &[Token],
) -> Result<Vec<u8>, AbiError> {
    let root = blocks::build_root(items, values)?;
    let mut out = Vec::with_capacity(SELECTOR_LEN + root.total_size());
    out.extend_from_slice(&selector);
    let base = out.len();
    let mut patches = Vec::new();
    write_block(&root, &mut out, &mut patches);
    apply_patches(&mut out, &patches);
    debug_assert_eq!(out.len() - base, root.total_size());
    Ok(out)
}

/// Phase two: flatten a block tree into bytes and resolve pointers.
fn serialize(root: &CalldataBlock) -> Vec<u8> {
    let mut out = Vec::with_capacity(root.total_size());
    let mut patches = Vec::new();
    write_block(root, &mut out, &mut patches);
    apply_patches(&mut out, &patches);
    out
}

fn apply_patches(out: &mut [u8], patches: &[(usize, usize)]) {
    for &(slot, offset) in patches {
        let word = blocks::u256_word(&U256::from(offset));
        out[slot..slot + 32].copy_from_slice(&word);
    }
}

fn write_block(block: &CalldataBlock, out: &mut Vec<u8>, patches: &mut Vec<(usize, usize)>) {
    match block {
        CalldataBlock::Static(b) => out.extend_from_slice(&b.word),
        CalldataBlock::DynamicBytes(b) => {
            out.extend_from_slice(&blocks::u256_word(&U256::from(b.data.len())));
            out.extend_from_slice(&b.data);
            let padding = blocks::pad32(b.data.len()) - b.data.len();
            out.resize(out.len() + padding, 0);
        }
        CalldataBlock::Set(s) => write_region(&s.members, out, patches),
        CalldataBlock::Array(a) => {
            if let Some(count) = a.len_header {
                out.extend_from_slice(&blocks::u256_word(&U256::from(count)));
            }
            write_region(&a.members, out, patches);
        }
        // a bare pointer is a degenerate region of one member
        CalldataBlock::Pointer(_) => write_region(std::slice::from_ref(block), out, patches),
    }
}

/// Serialize one head+tail region. The region base is the current buffer
/// position; every pointer in this head resolves relative to it.
fn write_region(members: &[CalldataBlock], out: &mut Vec<u8>, patches: &mut Vec<(usize, usize)>) {
    let region_base = out.len();

    let mut pending: Vec<(usize, &CalldataBlock)> = Vec::new();
    for member in members {
        match member {
            CalldataBlock::Pointer(p) => {
                pending.push((out.len(), p.target.as_ref()));
                out.resize(out.len() + 32, 0);
            }
            _ => write_block(member, out, patches),
        }
    }

    for (slot, target) in pending {
        patches.push((slot, out.len() - region_base));
        write_block(target, out, patches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calldata_primitives::Address;

    fn items(tys: &[&str]) -> Vec<DataItem> {
        tys.iter().map(|t| DataItem::new(*t)).collect()
    }

    // ==================== Spec word-level scenarios ====================

    #[test]
    fn test_encode_address_word() {
        let addr = Address::from_hex("0x0001020304050607080900010203040506070809").unwrap();
        let encoded = encode_params(&items(&["address"]), &[Token::Address(addr)]).unwrap();
        assert_eq!(
            hex::encode(&encoded),
            "0000000000000000000000000001020304050607080900010203040506070809"
        );
    }

    #[test]
    fn test_encode_static_tuple_no_pointer() {
        let addr = Address::from_hex("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d").unwrap();
        let encoded = encode_params(
            &items(&["address", "uint256"]),
            &[Token::Address(addr), Token::Uint(U256::from(5))],
        )
        .unwrap();

        assert_eq!(encoded.len(), 64);
        assert_eq!(&encoded[12..32], addr.as_bytes());
        assert_eq!(encoded[63], 5);
        // fully static: no offset word anywhere
        assert_eq!(&encoded[32..63], &[0u8; 31]);
    }

    #[test]
    fn test_encode_bytes_length_and_padding() {
        let encoded = encode_params(
            &items(&["bytes"]),
            &[Token::Bytes(vec![0xde, 0xad, 0xbe, 0xef])],
        )
        .unwrap();

        // offset word + length word + padded payload
        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 4);
        assert_eq!(&encoded[64..68], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&encoded[68..96], &[0u8; 28]);
    }

    #[test]
    fn test_encode_bytes_uint_pair_pointer_value() {
        let encoded = encode_params(
            &items(&["bytes", "uint256"]),
            &[
                Token::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
                Token::Uint(U256::from(7)),
            ],
        )
        .unwrap();

        assert_eq!(encoded.len(), 128);
        // head: pointer to tail start (0x40), then the literal 7
        assert_eq!(encoded[31], 0x40);
        assert_eq!(encoded[63], 7);
        // tail: length 4, then payload
        assert_eq!(encoded[95], 4);
        assert_eq!(&encoded[96..100], &[0xde, 0xad, 0xbe, 0xef]);
    }

    // ==================== Arrays ====================

    #[test]
    fn test_encode_dynamic_array() {
        let encoded = encode_params(
            &items(&["uint256[]"]),
            &[Token::Array(vec![
                Token::Uint(U256::from(1)),
                Token::Uint(U256::from(2)),
            ])],
        )
        .unwrap();

        assert_eq!(encoded.len(), 128);
        assert_eq!(encoded[31], 0x20); // pointer to array
        assert_eq!(encoded[63], 2); // element count
        assert_eq!(encoded[95], 1);
        assert_eq!(encoded[127], 2);
    }

    #[test]
    fn test_encode_empty_dynamic_array() {
        let encoded = encode_params(&items(&["uint256[]"]), &[Token::Array(vec![])]).unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(&encoded[32..64], &[0u8; 32]);
    }

    #[test]
    fn test_encode_fixed_array_inline() {
        let encoded = encode_params(
            &items(&["uint256[2]"]),
            &[Token::FixedArray(vec![
                Token::Uint(U256::from(10)),
                Token::Uint(U256::from(11)),
            ])],
        )
        .unwrap();

        // no pointer, no length word
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 10);
        assert_eq!(encoded[63], 11);
    }

    #[test]
    fn test_encode_array_of_bytes_nested_pointers() {
        let encoded = encode_params(
            &items(&["bytes[]"]),
            &[Token::Array(vec![
                Token::Bytes(vec![0xaa]),
                Token::Bytes(vec![0xbb, 0xbb]),
            ])],
        )
        .unwrap();

        // 0x00 pointer to array (0x20)
        // 0x20 count = 2
        // 0x40 element pointer, relative to 0x40: 0x40
        // 0x60 element pointer, relative to 0x40: 0x80
        // 0x80 len 1 | 0xa0 payload aa
        // 0xc0 len 2 | 0xe0 payload bbbb
        assert_eq!(encoded.len(), 0x100);
        assert_eq!(encoded[31], 0x20);
        assert_eq!(encoded[63], 2);
        assert_eq!(encoded[95], 0x40);
        assert_eq!(encoded[127], 0x80);
        assert_eq!(encoded[159], 1);
        assert_eq!(encoded[160], 0xaa);
        assert_eq!(encoded[223], 2);
        assert_eq!(&encoded[224..226], &[0xbb, 0xbb]);
    }

    // ==================== Nested tuples ====================

    #[test]
    fn test_encode_nested_dynamic_tuple_offsets_are_region_relative() {
        // ((bytes),uint256): the inner tuple's pointer resolves against the
        // inner region base, not the buffer start
        let inner = DataItem::tuple(vec![DataItem::new("bytes")]);
        let params = vec![inner, DataItem::new("uint256")];
        let values = vec![
            Token::Tuple(vec![Token::Bytes(vec![0xdd])]),
            Token::Uint(U256::from(5)),
        ];
        let encoded = encode_params(&params, &values).unwrap();

        assert_eq!(encoded.len(), 160);
        assert_eq!(encoded[31], 0x40); // outer pointer, own-base relative
        assert_eq!(encoded[63], 5);
        assert_eq!(encoded[95], 0x20); // inner pointer, relative to 0x40
        assert_eq!(encoded[127], 1); // bytes length
        assert_eq!(encoded[128], 0xdd);
    }

    #[test]
    fn test_encode_static_nested_tuple_inlined() {
        let inner = DataItem::tuple(vec![DataItem::new("uint256"), DataItem::new("uint256")]);
        let params = vec![DataItem::new("bool"), inner];
        let values = vec![
            Token::Bool(true),
            Token::Tuple(vec![Token::Uint(U256::from(8)), Token::Uint(U256::from(9))]),
        ];
        let encoded = encode_params(&params, &values).unwrap();

        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 8);
        assert_eq!(encoded[95], 9);
    }

    // ==================== Selector header ====================

    #[test]
    fn test_encode_function_call_prefixes_selector() {
        let selector = [0xa9, 0x05, 0x9c, 0xbb];
        let addr = Address::from_hex("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d").unwrap();
        let encoded = encode_function_call(
            selector,
            &items(&["address", "uint256"]),
            &[Token::Address(addr), Token::Uint(U256::from(1000))],
        )
        .unwrap();

        assert_eq!(encoded.len(), 68);
        assert_eq!(&encoded[..4], &selector);
        assert_eq!(&encoded[16..36], addr.as_bytes());
    }

    #[test]
    fn test_encode_function_call_pointer_unaffected_by_selector() {
        // offsets stay word-grid relative; the 4-byte selector sits outside
        let selector = [0x11, 0x22, 0x33, 0x44];
        let encoded = encode_function_call(
            selector,
            &items(&["bytes"]),
            &[Token::Bytes(vec![0x01])],
        )
        .unwrap();
        assert_eq!(encoded.len(), 4 + 96);
        assert_eq!(encoded[4 + 31], 0x20);
    }

    // ==================== Failures ====================

    #[test]
    fn test_encode_arity_mismatch() {
        let result = encode_params(&items(&["uint256", "bool"]), &[Token::Bool(true)]);
        assert!(matches!(result, Err(AbiError::ValueTypeMismatch { .. })));
    }

    #[test]
    fn test_encode_unsupported_type() {
        let result = encode_params(&items(&["uint7"]), &[Token::Uint(U256::zero())]);
        assert!(matches!(result, Err(AbiError::UnsupportedType(_))));
    }

    // ==================== Pointer resolution invariant ====================

    #[test]
    fn test_pointer_targets_are_word_aligned() {
        let encoded = encode_params(
            &items(&["bytes", "uint256[]", "string"]),
            &[
                Token::Bytes(vec![1, 2, 3]),
                Token::Array(vec![Token::Uint(U256::from(9))]),
                Token::String("hello world".to_string()),
            ],
        )
        .unwrap();

        // the three head pointers must land on 32-byte boundaries within
        // the buffer, ordered as declared
        let offsets: Vec<usize> = (0..3)
            .map(|i| {
                let word = &encoded[i * 32..(i + 1) * 32];
                U256::from_big_endian(word).low_u64() as usize
            })
            .collect();
        assert_eq!(offsets[0], 96);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        for offset in offsets {
            assert_eq!(offset % 32, 0);
            assert!(offset < encoded.len());
        }
    }
}
