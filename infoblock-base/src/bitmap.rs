/// A growable bitmap that counts bits in order from least-to-most
/// significant bits and ascending words. Sized once, at construction.
#[derive(Clone, Default, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Bitmap {
    bits: Vec<u64>,
    len: usize,
}
impl Bitmap {
    pub fn new(len: usize) -> Self {
        Bitmap {
            bits: vec![0; len.div_ceil(64)],
            len,
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn set(&mut self, i: usize, val: bool) {
        assert!(i < self.len, "bit {} out of range {}", i, self.len);
        if val {
            self.bits[i / 64] |= 1 << (i % 64);
        } else {
            self.bits[i / 64] &= !(1 << (i % 64));
        }
    }
    // Out-of-range bits read as unset.
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.bits[i / 64] & (1 << (i % 64))) != 0
    }
    pub fn count(&self) -> usize {
        self.bits.iter().map(|x| x.count_ones() as usize).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|x| *x == 0)
    }
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |i| self.get(*i))
    }
}
