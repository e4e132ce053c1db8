#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic terrain synthesis for skirmish maps.
//!
//! The synthesizer turns the byte stream of a [`SkirmishRng`] into a 64×64
//! grid of terrain classes. A coarse 16×16 noise lattice is perturbed,
//! upsampled onto the tile grid, smoothed, cut into mountain, rock, sand and
//! dunes, sprinkled with spice fields and finally assigned renderer sprite
//! indices. Every step consumes the stream in a fixed order, so a seed always
//! reproduces the same terrain bit for bit.

mod steps;

use dune_skirmish_core::{
    LandscapeParams, SkirmishRng, TerrainClass, TerrainGrid, MAP_SIZE, MAP_TILE_COUNT,
};

/// Number of coarse lattice cells, including the trailing guard cell.
const LATTICE_CELLS: usize = 273;

/// Index of the last addressable lattice cell.
const LATTICE_LAST: i32 = 272;

/// Neighbourhood touched by a single lattice perturbation.
const LATTICE_AROUND: [i32; 21] = [
    0, -1, 1, -16, 16, -17, 17, -15, 15, -2, 2, -32, 32, -4, 4, -64, 64, -30, 30, -34, 34,
];

/// Midpoint templates used to upsample a 4×4 block, as `(x1, y1, x2, y2)` offsets.
///
/// Odd columns use the second template, which differs only in its diagonal entry.
const UPSAMPLE_TEMPLATES: [[[u16; 4]; 21]; 2] = [
    [
        [0, 0, 4, 0],
        [4, 0, 4, 4],
        [0, 0, 0, 4],
        [0, 4, 4, 4],
        [0, 0, 0, 2],
        [0, 2, 0, 4],
        [0, 0, 2, 0],
        [2, 0, 4, 0],
        [4, 0, 4, 2],
        [4, 2, 4, 4],
        [0, 4, 2, 4],
        [2, 4, 4, 4],
        [0, 0, 4, 4],
        [2, 0, 2, 2],
        [0, 0, 2, 2],
        [4, 0, 2, 2],
        [0, 2, 2, 2],
        [2, 2, 4, 2],
        [2, 2, 0, 4],
        [2, 2, 4, 4],
        [2, 2, 2, 4],
    ],
    [
        [0, 0, 4, 0],
        [4, 0, 4, 4],
        [0, 0, 0, 4],
        [0, 4, 4, 4],
        [0, 0, 0, 2],
        [0, 2, 0, 4],
        [0, 0, 2, 0],
        [2, 0, 4, 0],
        [4, 0, 4, 2],
        [4, 2, 4, 4],
        [0, 4, 2, 4],
        [2, 4, 4, 4],
        [4, 0, 0, 4],
        [2, 0, 2, 2],
        [0, 0, 2, 2],
        [4, 0, 2, 2],
        [0, 2, 2, 2],
        [2, 2, 4, 2],
        [2, 2, 0, 4],
        [2, 2, 4, 4],
        [2, 2, 2, 4],
    ],
];

/// Draws allowed when looking for a spice field centre before the field is skipped.
const MAX_FIELD_CENTRE_DRAWS: u32 = 4096;

/// Width of the playfield expressed in sub-tile units.
const SUBTILE_LIMIT: u16 = 16384;

/// Packs tile coordinates the way the lattice addressing expects: `(y << 6) | x`.
///
/// Coordinates of 64 or more alias or overflow instead of failing; callers
/// treat any result of 4096 or above as off the map.
const fn pack_xy(x: u16, y: u16) -> u16 {
    (y << 6) | x
}

const fn is_off_map(packed: u16) -> bool {
    packed & 0xF000 != 0
}

/// Cut points separating height values into terrain classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    rock: u16,
    dune: u16,
}

impl Thresholds {
    /// Draws the cut points from the byte stream.
    fn draw(rng: &mut SkirmishRng) -> Self {
        let rock = u16::from(rng.byte() & 0xF).clamp(8, 12);
        let dune = u16::from(rng.byte() & 0x3).wrapping_sub(1).min(rock - 3);
        Self { rock, dune }
    }

    /// Height from which tiles become rock.
    #[must_use]
    pub const fn rock(&self) -> u16 {
        self.rock
    }

    /// Height up to which tiles become dunes.
    #[must_use]
    pub const fn dune(&self) -> u16 {
        self.dune
    }

    /// Classifies a smoothed height value.
    #[must_use]
    pub const fn classify(&self, height: u16) -> TerrainClass {
        if height > self.rock + 4 {
            TerrainClass::Mountain
        } else if height >= self.rock {
            TerrainClass::Rock
        } else if height <= self.dune {
            TerrainClass::Dune
        } else {
            TerrainClass::Sand
        }
    }
}

/// Pure system that synthesizes terrain grids from the random stream.
#[derive(Debug)]
pub struct TerrainSynthesizer {
    heights: Vec<u16>,
}

impl TerrainSynthesizer {
    /// Creates a synthesizer with a preallocated height buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heights: vec![0; MAP_TILE_COUNT],
        }
    }

    /// Produces the terrain of a whole map, drawing only from the byte stream.
    pub fn synthesize(&mut self, rng: &mut SkirmishRng, params: LandscapeParams) -> TerrainGrid {
        self.heights.fill(0);
        self.rough_lattice(rng);
        self.upsample_lattice();
        self.box_average();

        let thresholds = Thresholds::draw(rng);
        tracing::debug!(
            target: "dune_skirmish::terrain",
            rock = thresholds.rock(),
            dune = thresholds.dune(),
            "terrain.thresholds"
        );

        let mut classes: Vec<TerrainClass> = self
            .heights
            .iter()
            .map(|height| thresholds.classify(*height))
            .collect();

        let fields = scatter_spice(rng, params, &mut classes);
        tracing::debug!(
            target: "dune_skirmish::terrain",
            fields,
            min = params.min_spice_fields,
            max = params.max_spice_fields,
            "terrain.spice_fields"
        );

        let sprites = sprite_indices(&classes);
        let grid = TerrainGrid::from_parts(classes, sprites);
        // Both vectors are built from the full-size height buffer.
        grid.unwrap_or_default()
    }

    fn rough_lattice(&mut self, rng: &mut SkirmishRng) {
        let mut lattice = [0u8; LATTICE_CELLS];
        for cell in lattice.iter_mut().take(LATTICE_CELLS - 1) {
            *cell = (rng.byte() & 0xF).min(0xA);
        }

        let passes = (rng.byte() & 0xF) + 1;
        for _ in 0..passes {
            let base = i32::from(rng.byte());
            for offset in LATTICE_AROUND {
                let index = (base + offset).clamp(0, LATTICE_LAST) as usize;
                lattice[index] = (lattice[index] + (rng.byte() & 0xF)) & 0xF;
            }
        }

        let passes = (rng.byte() & 0x3) + 1;
        for _ in 0..passes {
            let base = i32::from(rng.byte());
            for offset in LATTICE_AROUND {
                let index = (base + offset).clamp(0, LATTICE_LAST) as usize;
                lattice[index] = rng.byte() & 0x3;
            }
        }

        for j in 0..16u16 {
            for i in 0..16u16 {
                let packed = usize::from(pack_xy(4 * i, 4 * j));
                self.heights[packed] = u16::from(lattice[usize::from(16 * j + i)]);
            }
        }
    }

    fn upsample_lattice(&mut self) {
        for j in 0..16u16 {
            for i in 0..16u16 {
                let template = &UPSAMPLE_TEMPLATES[usize::from((i + 1) % 2)];
                for [ox1, oy1, ox2, oy2] in template {
                    let (x1, y1) = (4 * i + ox1, 4 * j + oy1);
                    let (x2, y2) = (4 * i + ox2, 4 * j + oy2);

                    let midpoint = (pack_xy(x1, y1) + pack_xy(x2, y2)) / 2;
                    if is_off_map(midpoint) {
                        continue;
                    }

                    // The first sample wraps horizontally and is always on the map;
                    // the second reads as zero once it falls off the bottom edge.
                    let first = self.height_at(pack_xy(x1 & 0x3F, y1));
                    let second = self.height_at(pack_xy(x2 & 0x3F, y2));
                    self.heights[usize::from(midpoint)] = (first + second + 1) / 2;
                }
            }
        }
    }

    fn height_at(&self, packed: u16) -> u16 {
        self.heights.get(usize::from(packed)).copied().unwrap_or(0)
    }

    fn box_average(&mut self) {
        let size = usize::from(MAP_SIZE);
        let last = size - 1;
        let mut current = vec![0u16; size];
        let mut previous = vec![0u16; size];

        for j in 0..size {
            let row = j * size;
            previous.copy_from_slice(&current);
            current.copy_from_slice(&self.heights[row..row + size]);

            for i in 0..size {
                let centre = current[i];
                let below = |offset: usize| self.heights[row + size + i + offset - 1];

                let mut sum = 0u16;
                sum += if i == 0 || j == 0 { centre } else { previous[i - 1] };
                sum += if j == 0 { centre } else { previous[i] };
                sum += if i == last || j == 0 { centre } else { previous[i + 1] };
                sum += if i == 0 { centre } else { current[i - 1] };
                sum += centre;
                sum += if i == last { centre } else { current[i + 1] };
                sum += if i == 0 || j == last { centre } else { below(0) };
                sum += if j == last { centre } else { below(1) };
                sum += if i == last || j == last { centre } else { below(2) };

                self.heights[row + i] = sum / 9;
            }
        }
    }
}

impl Default for TerrainSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Scatters spice fields over sand and returns how many fields were grown.
fn scatter_spice(
    rng: &mut SkirmishRng,
    params: LandscapeParams,
    classes: &mut [TerrainClass],
) -> u32 {
    let min = u32::from(params.min_spice_fields);
    let max = u32::from(params.max_spice_fields).max(min);
    let count = min + u32::from(rng.byte()) % (max - min + 1);

    for field in 0..count {
        let Some(centre) = pick_field_centre(rng, classes) else {
            tracing::debug!(
                target: "dune_skirmish::terrain",
                field,
                count,
                "terrain.spice_field_skipped"
            );
            return field;
        };

        let steps = rng.byte() & 0x1F;
        for _ in 0..steps {
            loop {
                let distance = u16::from(rng.byte() & 0x3F);
                let landing = move_by_random(rng, centre, distance);
                let packed = landing.packed();
                if !is_off_map(packed) {
                    add_spice(classes, packed);
                    break;
                }
            }
        }
    }
    count
}

fn pick_field_centre(rng: &mut SkirmishRng, classes: &[TerrainClass]) -> Option<SubTile> {
    for _ in 0..MAX_FIELD_CENTRE_DRAWS {
        let y = u16::from(rng.byte() & 0x3F);
        let x = u16::from(rng.byte() & 0x3F);
        if classes[usize::from(pack_xy(x, y))].is_sand_like() {
            return Some(SubTile::centre_of(x, y));
        }
    }
    None
}

/// Position measured in 1/256ths of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SubTile {
    x: u16,
    y: u16,
}

impl SubTile {
    const fn centre_of(x: u16, y: u16) -> Self {
        Self {
            x: (x << 8) | 0x80,
            y: (y << 8) | 0x80,
        }
    }

    const fn packed(self) -> u16 {
        pack_xy(self.x >> 8, self.y >> 8)
    }
}

/// Moves up to `distance` sub-tile steps in a random direction and recentres.
///
/// Moves that leave the playfield return the starting position unchanged.
fn move_by_random(rng: &mut SkirmishRng, from: SubTile, distance: u16) -> SubTile {
    if distance == 0 {
        return from;
    }

    let mut reach = u16::from(rng.byte());
    while reach > distance {
        reach /= 2;
    }
    let orientation = usize::from(rng.byte());

    let dx = i32::from(steps::STEP_X[orientation]) * i32::from(reach) / 128 * 16;
    let dy = i32::from(steps::STEP_Y[orientation]) * i32::from(reach) / 128 * 16;
    let x = (i32::from(from.x) + dx) as u16;
    let y = (i32::from(from.y) - dy) as u16;

    if x > SUBTILE_LIMIT || y > SUBTILE_LIMIT {
        return from;
    }
    SubTile {
        x: (x & 0xFF00) | 0x80,
        y: (y & 0xFF00) | 0x80,
    }
}

/// Raises the spice on a tile, letting thick spice spill onto its neighbours.
fn add_spice(classes: &mut [TerrainClass], packed: u16) {
    let centre = usize::from(packed);
    match classes[centre] {
        TerrainClass::Spice | TerrainClass::ThickSpice => {
            classes[centre] = TerrainClass::ThickSpice;
            let x = packed & 0x3F;
            let y = (packed >> 6) & 0x3F;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let neighbour = pack_xy(
                        (i32::from(x) + dx) as u16,
                        (i32::from(y) + dy) as u16,
                    );
                    if is_off_map(neighbour) {
                        continue;
                    }
                    let neighbour = usize::from(neighbour);
                    if !classes[neighbour].can_become_spice() {
                        classes[centre] = TerrainClass::Spice;
                    } else if classes[neighbour] != TerrainClass::ThickSpice {
                        classes[neighbour] = TerrainClass::Spice;
                    }
                }
            }
        }
        other => {
            if other.can_become_spice() {
                classes[centre] = TerrainClass::Spice;
            }
        }
    }
}

/// Computes renderer sprite indices from same-class neighbour masks.
///
/// Bits are up = 1, right = 2, down = 4, left = 8; neighbours beyond the map
/// edge count as equal to the tile itself.
#[must_use]
pub fn sprite_indices(classes: &[TerrainClass]) -> Vec<u16> {
    let size = usize::from(MAP_SIZE);
    let last = size - 1;
    let mut sprites = Vec::with_capacity(classes.len());

    for j in 0..size {
        for i in 0..size {
            let at = |x: usize, y: usize| classes[y * size + x];
            let centre = at(i, j);
            let neighbours = [
                if j == 0 { centre } else { at(i, j - 1) },
                if i == last { centre } else { at(i + 1, j) },
                if j == last { centre } else { at(i, j + 1) },
                if i == 0 { centre } else { at(i - 1, j) },
            ];
            let mask_of = |class: TerrainClass| {
                neighbours
                    .iter()
                    .enumerate()
                    .filter(|(_, neighbour)| **neighbour == class)
                    .fold(0u16, |mask, (bit, _)| mask | (1 << bit))
            };

            let same = mask_of(centre);
            let sprite = match centre {
                TerrainClass::Sand => 0,
                TerrainClass::Rock => (same | mask_of(TerrainClass::Mountain)) + 1,
                TerrainClass::Dune => same + 17,
                TerrainClass::Mountain => same + 33,
                TerrainClass::Spice => (same | mask_of(TerrainClass::ThickSpice)) + 49,
                TerrainClass::ThickSpice => same + 65,
                _ => same,
            };
            sprites.push(sprite);
        }
    }
    sprites
}
