//! Placement validity rules shared by command execution and queries.

use dune_skirmish_core::{
    HouseId, PlacementError, StructureKind, TerrainClass, TileIndex, UnitKind,
};

use crate::World;

/// Validates a structure footprint and returns the tiles it would cover.
pub(crate) fn structure_tiles(
    world: &World,
    house: HouseId,
    kind: StructureKind,
    origin: TileIndex,
) -> Result<Vec<TileIndex>, PlacementError> {
    if !world.knows_house(house) {
        return Err(PlacementError::UnknownHouse);
    }
    let tiles = kind
        .footprint()
        .covered_tiles(origin)
        .ok_or(PlacementError::OutOfBounds)?;

    for tile in &tiles {
        if !world.area.contains(*tile) {
            return Err(PlacementError::OutOfBounds);
        }
        let state = world.tile(*tile);
        if state.structure.is_some() || state.ground == TerrainClass::Wall {
            return Err(PlacementError::Occupied);
        }
        if state.unit.is_some() {
            return Err(PlacementError::UnitPresent);
        }
        if !state.ground.supports_structure() {
            return Err(PlacementError::UnsuitableTerrain);
        }
    }
    Ok(tiles)
}

/// Validates a single concrete slab.
pub(crate) fn slab(world: &World, house: HouseId, tile: TileIndex) -> Result<(), PlacementError> {
    if !world.knows_house(house) {
        return Err(PlacementError::UnknownHouse);
    }
    open_ground(world, tile)?;
    let ground = world.tile(tile).ground;
    if ground == TerrainClass::ConcreteSlab {
        return Err(PlacementError::Occupied);
    }
    if !ground.accepts_slab() {
        return Err(PlacementError::UnsuitableTerrain);
    }
    Ok(())
}

/// Validates a single wall segment sealing off a pocket of buildable ground.
pub(crate) fn wall(world: &World, house: HouseId, tile: TileIndex) -> Result<(), PlacementError> {
    if !world.knows_house(house) {
        return Err(PlacementError::UnknownHouse);
    }
    open_ground(world, tile)?;
    if !world.tile(tile).ground.is_buildable_ground() {
        return Err(PlacementError::UnsuitableTerrain);
    }
    Ok(())
}

/// Validates a unit deployment.
pub(crate) fn unit(
    world: &World,
    house: HouseId,
    kind: UnitKind,
    tile: TileIndex,
) -> Result<(), PlacementError> {
    if !world.knows_house(house) {
        return Err(PlacementError::UnknownHouse);
    }
    open_ground(world, tile)?;
    let ground = world.tile(tile).ground;
    let suitable = match kind {
        UnitKind::Sandworm => ground.is_worm_habitat(),
        _ if ground == TerrainClass::SpiceBloom => false,
        _ if ground == TerrainClass::Mountain => kind.is_infantry(),
        _ => true,
    };
    if !suitable {
        return Err(PlacementError::UnsuitableTerrain);
    }
    Ok(())
}

/// Validates a spice bloom.
pub(crate) fn bloom(world: &World, tile: TileIndex) -> Result<(), PlacementError> {
    open_ground(world, tile)?;
    if !world.tile(tile).ground.is_sand_like() {
        return Err(PlacementError::UnsuitableTerrain);
    }
    Ok(())
}

fn open_ground(world: &World, tile: TileIndex) -> Result<(), PlacementError> {
    if !world.area.contains(tile) {
        return Err(PlacementError::OutOfBounds);
    }
    let state = world.tile(tile);
    if state.structure.is_some() || state.ground == TerrainClass::Wall {
        return Err(PlacementError::Occupied);
    }
    if state.unit.is_some() {
        return Err(PlacementError::UnitPresent);
    }
    Ok(())
}
