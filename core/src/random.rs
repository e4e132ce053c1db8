//! Deterministic random stream shared by every generation component.
//!
//! Two generators live side by side. The byte stream is a four byte shift
//! register used for terrain noise, flood-fill rotations and other coin flips.
//! The linear congruential generator answers inclusive range queries such as
//! island and tile picks. Both are seeded from the same map seed, and
//! components draw from them in a fixed call order, so a seed reproduces the
//! whole map.

/// Multiplier of the linear congruential generator.
const LCG_MULTIPLIER: u32 = 0x015A_4E35;

/// Exclusive upper bound of a single LCG draw.
const LCG_SPAN: u32 = 0x8000;

/// Seeded pair of generators threaded by `&mut` through a generation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkirmishRng {
    bytes: [u8; 4],
    lcg: u32,
}

impl SkirmishRng {
    /// Seeds both generators from a map seed.
    ///
    /// The byte stream takes the little-endian bytes of the full seed; the
    /// range generator takes its low sixteen bits.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            bytes: seed.to_le_bytes(),
            lcg: seed & 0xFFFF,
        }
    }

    /// Draws the next byte of the shift-register stream.
    pub fn byte(&mut self) -> u8 {
        let [s0, s1, s2, _] = &mut self.bytes;

        let carry0 = (*s0 >> 1) & 0x01;
        let carry2 = *s2 >> 7;
        *s2 = (*s2 << 1) | carry0;

        let carry1 = *s1 >> 7;
        *s1 = (*s1 << 1) | carry2;

        let carry = (*s0 >> 2).wrapping_sub(*s0).wrapping_sub(carry1 ^ 0x01) & 0x01;
        *s0 = (carry << 7) | (*s0 >> 1);

        *s0 ^ *s1
    }

    fn next_lcg(&mut self) -> u32 {
        self.lcg = self.lcg.wrapping_mul(LCG_MULTIPLIER).wrapping_add(1);
        (self.lcg >> 16) & 0x7FFF
    }

    /// Draws a value in the inclusive range between `min` and `max`.
    ///
    /// Reversed bounds are swapped before drawing.
    pub fn range(&mut self, min: u16, max: u16) -> u16 {
        let (low, high) = if min > max { (max, min) } else { (min, max) };
        let span = u32::from(high) - u32::from(low) + 1;
        let offset = self.next_lcg() * span / LCG_SPAN;
        // offset < span, so the sum never exceeds `high`.
        low + offset as u16
    }

    /// Draws an index in the inclusive range between `min` and `max`.
    ///
    /// Bounds beyond sixteen bits are clamped; map-sized collections never
    /// reach them.
    pub fn range_index(&mut self, min: usize, max: usize) -> usize {
        let clamp = |value: usize| u16::try_from(value).unwrap_or(u16::MAX);
        usize::from(self.range(clamp(min), clamp(max)))
    }
}
