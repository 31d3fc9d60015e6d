// crates/pixpack-core/src/entropy/huffman.rs
//
// Full-alphabet Huffman coding with a pointer-free tree serialization.
//
// Tree shape on the wire:
//   form: preorder walk, 0 = internal node, 1 = leaf (left subtree before right)
//   perm: leaf symbols in the order the walk visits them
// A symbol's code is its root-to-leaf path (left = 0, right = 1). Every symbol
// of the alphabet owns a leaf, including zero-frequency ones, so perm always
// has exactly `alphabet` entries.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::entropy::bits::{BitReader, BitWriter};
use crate::error::{PixError, Result};

pub const MAX_ALPHABET: usize = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Node {
    Leaf(u8),
    Internal { left: u32, right: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanCode {
    alphabet: usize,
    form: Vec<bool>,
    perm: Vec<u8>,
    codes: Vec<Vec<bool>>,
    counts: Vec<u64>,
}

impl HuffmanCode {
    /// Build a code from the symbol frequencies of `stream`.
    ///
    /// Ties between equal weights go to the node inserted first: leaves in
    /// symbol order, then merged nodes in creation order.
    pub fn build(stream: &[u8], alphabet: usize) -> Result<Self> {
        validate_alphabet(alphabet)?;

        let mut counts = vec![0u64; alphabet];
        for &s in stream {
            let slot = counts.get_mut(s as usize).ok_or_else(|| {
                PixError::Validation(format!(
                    "symbol {} outside alphabet of size {}",
                    s, alphabet
                ))
            })?;
            *slot += 1;
        }

        let mut nodes: Vec<Node> = (0..alphabet).map(|s| Node::Leaf(s as u8)).collect();
        let mut heap: BinaryHeap<Reverse<(u64, u64, u32)>> = counts
            .iter()
            .enumerate()
            .map(|(s, &c)| Reverse((c, s as u64, s as u32)))
            .collect();

        let mut seq = alphabet as u64;
        while heap.len() > 1 {
            let (Some(Reverse((w1, _, left))), Some(Reverse((w2, _, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            nodes.push(Node::Internal { left, right });
            heap.push(Reverse((w1 + w2, seq, (nodes.len() - 1) as u32)));
            seq += 1;
        }
        let root = nodes.len() - 1;

        let (form, perm, codes) = serialize(&nodes, root, alphabet);
        Ok(Self { alphabet, form, perm, codes, counts })
    }

    #[inline]
    pub fn alphabet(&self) -> usize {
        self.alphabet
    }

    pub fn form(&self) -> &[bool] {
        &self.form
    }

    pub fn perm(&self) -> &[u8] {
        &self.perm
    }

    /// Root-to-leaf path for `symbol`. Empty for a single-leaf tree.
    pub fn code(&self, symbol: u8) -> &[bool] {
        &self.codes[symbol as usize]
    }

    /// Per-symbol code length, indexed by symbol.
    pub fn lengths(&self) -> Vec<u32> {
        self.codes.iter().map(|c| c.len() as u32).collect()
    }

    pub fn max_length(&self) -> usize {
        self.codes.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn encode_symbol(&self, symbol: u8, out: &mut BitWriter) -> Result<()> {
        let code = self.codes.get(symbol as usize).ok_or_else(|| {
            PixError::Validation(format!(
                "symbol {} outside alphabet of size {}",
                symbol, self.alphabet
            ))
        })?;
        out.extend(code);
        Ok(())
    }

    pub fn encode(&self, stream: &[u8]) -> Result<BitWriter> {
        let mut w = BitWriter::new();
        for &s in stream {
            self.encode_symbol(s, &mut w)?;
        }
        Ok(w)
    }

    /// Bits needed to encode the stream `build` saw.
    pub fn encoded_bits(&self) -> u64 {
        self.counts
            .iter()
            .zip(self.codes.iter())
            .map(|(&c, code)| c * code.len() as u64)
            .sum()
    }

    /// Shannon lower bound (rounded down) for the stream `build` saw. Diagnostic only.
    pub fn shannon_bits(&self) -> u64 {
        shannon_bits(&self.counts)
    }
}

pub fn shannon_bits(counts: &[u64]) -> u64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0;
    }
    let mut bits = 0.0f64;
    for &c in counts {
        if c == 0 {
            continue;
        }
        let p = c as f64 / total as f64;
        bits -= c as f64 * p.log2();
    }
    bits.floor() as u64
}

/// Preorder walk producing form, perm and codes. The path travels with each
/// stack entry so no traversal state is shared.
fn serialize(nodes: &[Node], root: usize, alphabet: usize) -> (Vec<bool>, Vec<u8>, Vec<Vec<bool>>) {
    let mut form = Vec::with_capacity(2 * alphabet - 1);
    let mut perm = Vec::with_capacity(alphabet);
    let mut codes = vec![Vec::new(); alphabet];

    let mut stack: Vec<(u32, Vec<bool>)> = vec![(root as u32, Vec::new())];
    while let Some((idx, path)) = stack.pop() {
        match nodes[idx as usize] {
            Node::Leaf(sym) => {
                form.push(true);
                perm.push(sym);
                codes[sym as usize] = path;
            }
            Node::Internal { left, right } => {
                form.push(false);
                let mut right_path = path.clone();
                right_path.push(true);
                let mut left_path = path;
                left_path.push(false);
                // left is popped first
                stack.push((right, right_path));
                stack.push((left, left_path));
            }
        }
    }

    (form, perm, codes)
}

fn validate_alphabet(alphabet: usize) -> Result<()> {
    if alphabet == 0 || alphabet > MAX_ALPHABET {
        return Err(PixError::Validation(format!(
            "alphabet must be in 1..={}, got {}",
            MAX_ALPHABET, alphabet
        )));
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Slot {
    Leaf(u8),
    Node(u32),
}

/// Decoder-side tree rebuilt from `form` + `perm` without explicit pointers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeTree {
    root: Slot,
    nodes: Vec<[Slot; 2]>,
}

impl DecodeTree {
    /// Rebuild a tree. `form` must be consumed exactly and every `perm` entry
    /// must be used by exactly one leaf.
    pub fn from_form_perm(form: &[bool], perm: &[u8]) -> Result<Self> {
        let mut bits = form.iter().copied();
        let mut leaves = perm.iter().copied();
        let mut nodes: Vec<[Slot; 2]> = Vec::new();

        let mut next_slot = |is_leaf: bool, nodes: &mut Vec<[Slot; 2]>| -> Result<Slot> {
            if is_leaf {
                leaves
                    .next()
                    .map(Slot::Leaf)
                    .ok_or_else(|| PixError::BundleFormat("huffman: perm exhausted".into()))
            } else {
                if nodes.len() >= perm.len() {
                    return Err(PixError::BundleFormat("huffman: too many internal nodes".into()));
                }
                nodes.push([Slot::Leaf(0); 2]);
                Ok(Slot::Node((nodes.len() - 1) as u32))
            }
        };

        let first = bits
            .next()
            .ok_or_else(|| PixError::BundleFormat("huffman: empty form".into()))?;
        let root = next_slot(first, &mut nodes)?;

        // pending (parent, side) slots; left side on top
        let mut pending: Vec<(u32, usize)> = Vec::new();
        if let Slot::Node(idx) = root {
            pending.push((idx, 1));
            pending.push((idx, 0));
        }
        while let Some((parent, side)) = pending.pop() {
            let bit = bits
                .next()
                .ok_or_else(|| PixError::BundleFormat("huffman: form truncated".into()))?;
            let child = next_slot(bit, &mut nodes)?;
            nodes[parent as usize][side] = child;
            if let Slot::Node(idx) = child {
                pending.push((idx, 1));
                pending.push((idx, 0));
            }
        }

        if bits.next().is_some() {
            return Err(PixError::BundleFormat("huffman: trailing form bits".into()));
        }
        if leaves.next().is_some() {
            return Err(PixError::BundleFormat("huffman: unused perm entries".into()));
        }

        Ok(Self { root, nodes })
    }

    pub fn decode_symbol(&self, r: &mut BitReader<'_>) -> Result<u8> {
        let mut cur = self.root;
        loop {
            match cur {
                Slot::Leaf(sym) => return Ok(sym),
                Slot::Node(idx) => {
                    let side = r.read_bit()? as usize;
                    cur = self.nodes[idx as usize][side];
                }
            }
        }
    }

    pub fn decode(&self, r: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.decode_symbol(r)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_and_perm_sizes_cover_full_alphabet() {
        let code = HuffmanCode::build(&[1, 1, 2], 16).unwrap();
        assert_eq!(code.perm().len(), 16);
        assert_eq!(code.form().len(), 31);
        assert_eq!(code.form().iter().filter(|&&b| b).count(), 16);

        let mut sorted = code.perm().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0u8..16).collect::<Vec<_>>());
    }

    #[test]
    fn frequent_symbol_gets_shortest_code() {
        let mut stream = vec![7u8; 100];
        stream.extend([3u8; 10]);
        stream.push(9);
        let code = HuffmanCode::build(&stream, 16).unwrap();
        assert!(code.code(7).len() <= code.code(3).len());
        assert!(code.code(3).len() <= code.code(9).len());
        assert_eq!(code.code(7).len(), 1);
    }

    #[test]
    fn single_symbol_alphabet_has_empty_code() {
        let code = HuffmanCode::build(&[0, 0, 0], 1).unwrap();
        assert_eq!(code.form(), &[true]);
        assert_eq!(code.perm(), &[0]);
        assert!(code.code(0).is_empty());

        let w = code.encode(&[0, 0, 0]).unwrap();
        assert_eq!(w.bit_len(), 0);

        let tree = DecodeTree::from_form_perm(code.form(), code.perm()).unwrap();
        let mut r = BitReader::new(w.as_bytes(), 0).unwrap();
        assert_eq!(tree.decode(&mut r, 3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn codes_are_prefix_free() {
        let stream: Vec<u8> = (0..500u32).map(|i| ((i * i + 3 * i) % 23) as u8).collect();
        let code = HuffmanCode::build(&stream, 32).unwrap();
        for a in 0..32u8 {
            for b in 0..32u8 {
                if a == b {
                    continue;
                }
                let (ca, cb) = (code.code(a), code.code(b));
                assert!(!cb.starts_with(ca), "{a} is a prefix of {b}");
            }
        }
    }

    #[test]
    fn encoded_bits_not_below_shannon() {
        let stream: Vec<u8> = (0..1000u32).map(|i| (i % 7 + (i % 3) * 5) as u8).collect();
        let code = HuffmanCode::build(&stream, 256).unwrap();
        assert_eq!(code.encoded_bits(), code.encode(&stream).unwrap().bit_len() as u64);
        assert!(code.encoded_bits() >= code.shannon_bits());
        // Huffman stays within one bit per symbol of the bound.
        assert!(code.encoded_bits() <= code.shannon_bits() + stream.len() as u64);
    }

    #[test]
    fn rejects_symbol_outside_alphabet() {
        assert!(HuffmanCode::build(&[16], 16).is_err());
        assert!(HuffmanCode::build(&[], 0).is_err());
    }

    #[test]
    fn decode_tree_rejects_malformed_shapes() {
        // internal root with one leaf child only
        assert!(DecodeTree::from_form_perm(&[false, true], &[0]).is_err());
        // extra form bits
        assert!(DecodeTree::from_form_perm(&[true, true], &[0, 1]).is_err());
        // unused perm
        assert!(DecodeTree::from_form_perm(&[false, true, true], &[0, 1, 2]).is_err());
        assert!(DecodeTree::from_form_perm(&[], &[]).is_err());
    }
}
