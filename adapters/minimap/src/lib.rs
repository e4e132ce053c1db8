#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation of minimap snapshots as text and portable pixmaps.

use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use dune_skirmish_core::{HouseId, TerrainClass, MAP_SIZE};
use dune_skirmish_system_scenario::{MinimapCell, MinimapSnapshot};

/// RGBA color used when presenting a minimap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Byte RGB values of the color, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [
            channel_byte(self.red),
            channel_byte(self.green),
            channel_byte(self.blue),
        ]
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn channel_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Colors and glyphs used for every kind of minimap cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Palette;

impl Palette {
    /// Color of bare terrain.
    #[must_use]
    pub const fn terrain(&self, terrain: TerrainClass) -> Color {
        match terrain {
            TerrainClass::Sand => Color::from_rgb_u8(214, 172, 108),
            TerrainClass::Dune => Color::from_rgb_u8(190, 146, 84),
            TerrainClass::Rock => Color::from_rgb_u8(120, 104, 88),
            TerrainClass::Mountain => Color::from_rgb_u8(64, 52, 44),
            TerrainClass::Spice => Color::from_rgb_u8(224, 120, 40),
            TerrainClass::ThickSpice => Color::from_rgb_u8(176, 72, 24),
            TerrainClass::ConcreteSlab => Color::from_rgb_u8(160, 160, 160),
            TerrainClass::Wall => Color::from_rgb_u8(92, 92, 92),
            TerrainClass::Structure => Color::from_rgb_u8(200, 200, 200),
            TerrainClass::SpiceBloom => Color::from_rgb_u8(240, 200, 40),
        }
    }

    /// Banner color of a house.
    #[must_use]
    pub const fn house(&self, house: HouseId) -> Color {
        match house {
            HouseId::Harkonnen => Color::from_rgb_u8(170, 24, 24),
            HouseId::Atreides => Color::from_rgb_u8(32, 64, 180),
            HouseId::Ordos => Color::from_rgb_u8(24, 140, 48),
            HouseId::Fremen => Color::from_rgb_u8(150, 110, 60),
            HouseId::Sardaukar => Color::from_rgb_u8(120, 40, 140),
            HouseId::Mercenary => Color::from_rgb_u8(200, 180, 20),
            HouseId::Neutral => Color::from_rgb_u8(40, 40, 40),
        }
    }

    /// Color of a minimap cell; units are drawn lighter than structures.
    #[must_use]
    pub fn cell(&self, cell: MinimapCell) -> Color {
        match cell {
            MinimapCell::Terrain(terrain) => self.terrain(terrain),
            MinimapCell::Structure(house) => self.house(house),
            MinimapCell::Unit(house) => self.house(house).lighten(0.45),
        }
    }

    /// Character used for a minimap cell in text dumps.
    #[must_use]
    pub const fn glyph(&self, cell: MinimapCell) -> char {
        match cell {
            MinimapCell::Terrain(terrain) => match terrain {
                TerrainClass::Sand => ' ',
                TerrainClass::Dune => '.',
                TerrainClass::Rock => '+',
                TerrainClass::Mountain => '^',
                TerrainClass::Spice => '*',
                TerrainClass::ThickSpice => '@',
                TerrainClass::ConcreteSlab => '=',
                TerrainClass::Wall => '#',
                TerrainClass::Structure => 'X',
                TerrainClass::SpiceBloom => '%',
            },
            MinimapCell::Structure(house) => house_letter(house).to_ascii_uppercase(),
            MinimapCell::Unit(house) => house_letter(house),
        }
    }
}

const fn house_letter(house: HouseId) -> char {
    match house {
        HouseId::Harkonnen => 'h',
        HouseId::Atreides => 'a',
        HouseId::Ordos => 'o',
        HouseId::Fremen => 'f',
        HouseId::Sardaukar => 's',
        HouseId::Mercenary => 'm',
        HouseId::Neutral => 'w',
    }
}

/// Output sink able to present a minimap snapshot.
pub trait MinimapBackend {
    /// Presents the snapshot using the colors of `palette`.
    fn present(&mut self, snapshot: &MinimapSnapshot, palette: &Palette) -> AnyResult<()>;
}

/// Writes one line of glyphs per map row.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `out`.
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MinimapBackend for TextBackend<W> {
    fn present(&mut self, snapshot: &MinimapSnapshot, palette: &Palette) -> AnyResult<()> {
        for row in snapshot.rows() {
            let line: String = row.iter().map(|cell| palette.glyph(*cell)).collect();
            writeln!(self.out, "{}", line.trim_end()).context("failed to write minimap row")?;
        }
        Ok(())
    }
}

/// Writes a binary PPM image with `scale` pixels per tile edge.
#[derive(Debug)]
pub struct PpmBackend<W> {
    out: W,
    scale: u16,
}

impl<W: Write> PpmBackend<W> {
    /// Creates a backend writing to `out`; a zero scale is treated as one.
    #[must_use]
    pub fn new(out: W, scale: u16) -> Self {
        Self {
            out,
            scale: scale.max(1),
        }
    }

    /// Returns the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MinimapBackend for PpmBackend<W> {
    fn present(&mut self, snapshot: &MinimapSnapshot, palette: &Palette) -> AnyResult<()> {
        let scale = usize::from(self.scale);
        let edge = usize::from(MAP_SIZE) * scale;
        write!(self.out, "P6\n{edge} {edge}\n255\n").context("failed to write pixmap header")?;

        let mut line = Vec::with_capacity(edge * 3);
        for row in snapshot.rows() {
            line.clear();
            for cell in row {
                let rgb = palette.cell(*cell).to_rgb_u8();
                for _ in 0..scale {
                    line.extend_from_slice(&rgb);
                }
            }
            for _ in 0..scale {
                self.out
                    .write_all(&line)
                    .context("failed to write pixmap row")?;
            }
        }
        self.out.flush().context("failed to flush pixmap")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert_eq!(color.to_rgb_u8(), [128, 128, 128]);
        assert_eq!(Color::from_rgb_u8(10, 20, 30).lighten(2.0).to_rgb_u8(), [255, 255, 255]);
    }

    #[test]
    fn text_dump_has_one_line_per_row() {
        let mut backend = TextBackend::new(Vec::new());
        backend
            .present(&MinimapSnapshot::default(), &Palette)
            .expect("writing to memory succeeds");
        let text = String::from_utf8(backend.into_inner()).expect("ascii output");
        assert_eq!(text.lines().count(), usize::from(MAP_SIZE));
        assert!(text.lines().all(str::is_empty), "open sand trims to nothing");
    }

    #[test]
    fn pixmap_scales_every_tile() {
        let mut backend = PpmBackend::new(Vec::new(), 2);
        backend
            .present(&MinimapSnapshot::default(), &Palette)
            .expect("writing to memory succeeds");
        let bytes = backend.into_inner();
        let header = b"P6\n128 128\n255\n";
        assert!(bytes.starts_with(header));
        assert_eq!(bytes.len(), header.len() + 128 * 128 * 3);
        assert_eq!(&bytes[header.len()..header.len() + 3], &[214, 172, 108]);
    }

    #[test]
    fn glyphs_distinguish_structures_from_units() {
        let palette = Palette;
        assert_eq!(palette.glyph(MinimapCell::Structure(HouseId::Ordos)), 'O');
        assert_eq!(palette.glyph(MinimapCell::Unit(HouseId::Ordos)), 'o');
        assert_eq!(palette.glyph(MinimapCell::Unit(HouseId::Neutral)), 'w');
    }
}
