// crates/pixpack-core/src/palette/align.rs
//
// Cross-frame palette alignment for images of identical geometry.
//
// 1. For every ordered image pair (A, B) count how often local index c1 in A
//    sits on the same pixel as local index c2 in B.
// 2. Walk (count, A, B, c1, c2) in descending count order and merge the
//    classes of (A, c1) and (B, c2) unless the merged class would hold two
//    indices of one image (greedy; not a maximum-weight matching).
// 3. Classes take global slots by descending pixel weight: the smallest slot
//    in 1..16 free in every member image. A class with no common free slot is
//    split and each member takes its own smallest free slot.
// Index 0 (transparent) is never remapped.

use std::cmp::Reverse;

use crate::error::{PixError, Result};
use crate::palette::{IndexedImage, PALETTE_SLOTS};

/// Per-image local -> global index mapping.
pub type SlotMap = [u8; PALETTE_SLOTS];

struct Classes {
    parent: Vec<usize>,
    /// For a root: the local index each image contributes, if any.
    members: Vec<Vec<Option<u8>>>,
}

impl Classes {
    fn new(images: usize) -> Self {
        let nodes = images * PALETTE_SLOTS;
        let mut members = vec![vec![None; images]; nodes];
        for (node, m) in members.iter_mut().enumerate() {
            m[node / PALETTE_SLOTS] = Some((node % PALETTE_SLOTS) as u8);
        }
        Self { parent: (0..nodes).collect(), members }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge when no image would end up with two indices in one class.
    fn try_union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let clash = self.members[ra]
            .iter()
            .zip(&self.members[rb])
            .any(|(x, y)| x.is_some() && y.is_some());
        if clash {
            return false;
        }
        let (keep, gone) = if ra < rb { (ra, rb) } else { (rb, ra) };
        let moved = std::mem::take(&mut self.members[gone]);
        for (slot, m) in self.members[keep].iter_mut().zip(moved) {
            if m.is_some() {
                *slot = m;
            }
        }
        self.parent[gone] = keep;
        true
    }
}

/// Renumber the palettes of `images` in place so recurring colors share an
/// index. Returns the mapping applied to each image.
pub fn align_group(images: &mut [IndexedImage]) -> Result<Vec<SlotMap>> {
    let m = images.len();
    if m == 0 {
        return Ok(Vec::new());
    }
    let (w, h) = (images[0].width, images[0].height);
    if images.iter().any(|im| im.width != w || im.height != h) {
        return Err(PixError::Validation(
            "align_group: images must share geometry".into(),
        ));
    }

    let node = |img: usize, idx: u8| img * PALETTE_SLOTS + idx as usize;

    let mut weight = vec![0u64; m * PALETTE_SLOTS];
    for (i, im) in images.iter().enumerate() {
        for &p in &im.pixels {
            weight[node(i, p)] += 1;
        }
    }

    let mut candidates: Vec<(u64, usize, usize, u8, u8)> = Vec::new();
    for a in 0..m {
        for b in 0..m {
            if a == b {
                continue;
            }
            let mut cooc = [[0u64; PALETTE_SLOTS]; PALETTE_SLOTS];
            for (&c1, &c2) in images[a].pixels.iter().zip(&images[b].pixels) {
                cooc[c1 as usize][c2 as usize] += 1;
            }
            for c1 in 1..PALETTE_SLOTS {
                for c2 in 1..PALETTE_SLOTS {
                    let n = cooc[c1][c2];
                    if n > 0 {
                        candidates.push((n, a, b, c1 as u8, c2 as u8));
                    }
                }
            }
        }
    }
    candidates.sort_by_key(|&(n, a, b, c1, c2)| (Reverse(n), a, b, c1, c2));

    let mut classes = Classes::new(m);
    for &(_, a, b, c1, c2) in &candidates {
        classes.try_union(node(a, c1), node(b, c2));
    }

    // Collect classes of indices that actually occur.
    let mut roots: Vec<(u64, usize)> = Vec::new();
    let mut class_weight = vec![0u64; m * PALETTE_SLOTS];
    for i in 0..m {
        for idx in 1..PALETTE_SLOTS as u8 {
            let nd = node(i, idx);
            if weight[nd] == 0 {
                continue;
            }
            let r = classes.find(nd);
            if class_weight[r] == 0 {
                roots.push((0, r));
            }
            class_weight[r] += weight[nd];
        }
    }
    for entry in roots.iter_mut() {
        entry.0 = class_weight[entry.1];
    }
    roots.sort_by_key(|&(wt, r)| (Reverse(wt), r));

    let mut maps: Vec<SlotMap> = vec![[0u8; PALETTE_SLOTS]; m];
    let mut used = vec![[false; PALETTE_SLOTS]; m];
    for u in used.iter_mut() {
        u[0] = true;
    }

    for &(_, r) in &roots {
        let present: Vec<(usize, u8)> = classes.members[r]
            .iter()
            .enumerate()
            .filter_map(|(i, idx)| idx.map(|idx| (i, idx)))
            .filter(|&(i, idx)| weight[node(i, idx)] > 0)
            .collect();

        let shared = (1..PALETTE_SLOTS).find(|&s| present.iter().all(|&(i, _)| !used[i][s]));
        for &(i, idx) in &present {
            let slot = match shared {
                Some(s) => s,
                None => (1..PALETTE_SLOTS).find(|&s| !used[i][s]).unwrap_or(0),
            };
            used[i][slot] = true;
            maps[i][idx as usize] = slot as u8;
        }
    }

    for (im, map) in images.iter_mut().zip(&maps) {
        for p in im.pixels.iter_mut() {
            *p = map[*p as usize];
        }
        im.palette = remap_palette(im, map);
    }

    Ok(maps)
}

/// Move palette slots along with the pixels. Unused local slots keep no color.
fn remap_palette(im: &IndexedImage, map: &SlotMap) -> crate::palette::Palette {
    let mut full = *map;
    let mut taken = [false; PALETTE_SLOTS];
    for (idx, &g) in map.iter().enumerate() {
        if idx == 0 || g != 0 {
            taken[g as usize] = true;
        }
    }
    // Colors no pixel references still need a distinct home.
    for idx in 1..PALETTE_SLOTS {
        if full[idx] == 0 && im.palette.get(idx as u8).is_some() {
            if let Some(s) = (1..PALETTE_SLOTS).find(|&s| !taken[s]) {
                taken[s] = true;
                full[idx] = s as u8;
            }
        }
    }
    im.palette.remapped(&full)
}
