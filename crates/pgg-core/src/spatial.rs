//! Spatial Index
//!
//! Where agents sit on the grid. The engine only talks to the `SpatialIndex`
//! trait; `MultiGrid` is the rectangular implementation used by default.

use bevy_ecs::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

use crate::components::{AgentId, GridPos};
use crate::config::GridConfig;
use crate::error::EngineError;
use crate::random::RandomSource;

/// Positional lookup owned outside the agents
pub trait SpatialIndex: Send + Sync {
    /// Put a not-yet-placed agent at `pos`
    fn place(&mut self, id: AgentId, pos: GridPos) -> Result<(), EngineError>;

    /// Take an agent off the grid, returning its last cell
    fn remove(&mut self, id: AgentId) -> Option<GridPos>;

    /// Relocate a placed agent
    fn move_agent(&mut self, id: AgentId, pos: GridPos) -> Result<(), EngineError>;

    fn position_of(&self, id: AgentId) -> Option<GridPos>;

    /// Agents in the cells around `pos`, excluding the cell itself, sorted by id
    fn neighbors_of(&self, pos: GridPos) -> Vec<AgentId>;

    /// Cells around `pos`, excluding `pos`
    fn neighborhood(&self, pos: GridPos) -> Vec<GridPos>;

    /// Agents sharing `pos`, sorted by id
    fn cell_contents(&self, pos: GridPos) -> Vec<AgentId>;

    /// `(width, height)`
    fn dimensions(&self) -> (u32, u32);

    /// Uniformly random cell
    fn random_cell(&self, rng: &mut dyn RandomSource) -> GridPos {
        let (width, height) = self.dimensions();
        let x = rng.index(width as usize) as u32;
        let y = rng.index(height as usize) as u32;
        GridPos::new(x, y)
    }
}

/// Rectangular grid holding any number of agents per cell, Moore
/// neighborhood, optional wrap-around edges
#[derive(Debug, Clone)]
pub struct MultiGrid {
    width: u32,
    height: u32,
    torus: bool,
    cells: BTreeMap<GridPos, BTreeSet<AgentId>>,
    positions: BTreeMap<AgentId, GridPos>,
}

impl MultiGrid {
    pub fn new(width: u32, height: u32, torus: bool) -> Self {
        Self {
            width,
            height,
            torus,
            cells: BTreeMap::new(),
            positions: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        Self::new(config.width, config.height, config.torus)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn check_bounds(&self, pos: GridPos) -> Result<(), EngineError> {
        if pos.x >= self.width || pos.y >= self.height {
            return Err(EngineError::OutOfBounds { x: pos.x, y: pos.y });
        }
        Ok(())
    }

    /// Coordinate shifted by `delta`, or None when it falls off a bounded edge
    fn offset(value: u32, delta: i64, size: u32, torus: bool) -> Option<u32> {
        let shifted = value as i64 + delta;
        if torus {
            Some(shifted.rem_euclid(size as i64) as u32)
        } else if (0..size as i64).contains(&shifted) {
            Some(shifted as u32)
        } else {
            None
        }
    }

    fn detach(&mut self, id: AgentId, pos: GridPos) {
        if let Some(occupants) = self.cells.get_mut(&pos) {
            occupants.remove(&id);
            if occupants.is_empty() {
                self.cells.remove(&pos);
            }
        }
    }
}

impl SpatialIndex for MultiGrid {
    fn place(&mut self, id: AgentId, pos: GridPos) -> Result<(), EngineError> {
        self.check_bounds(pos)?;
        if self.positions.contains_key(&id) {
            return Err(EngineError::IdCollision(id.0));
        }
        self.positions.insert(id, pos);
        self.cells.entry(pos).or_default().insert(id);
        Ok(())
    }

    fn remove(&mut self, id: AgentId) -> Option<GridPos> {
        let pos = self.positions.remove(&id)?;
        self.detach(id, pos);
        Some(pos)
    }

    fn move_agent(&mut self, id: AgentId, pos: GridPos) -> Result<(), EngineError> {
        self.check_bounds(pos)?;
        let old = self
            .positions
            .get(&id)
            .copied()
            .ok_or(EngineError::UnknownAgent(id.0))?;
        self.detach(id, old);
        self.positions.insert(id, pos);
        self.cells.entry(pos).or_default().insert(id);
        Ok(())
    }

    fn position_of(&self, id: AgentId) -> Option<GridPos> {
        self.positions.get(&id).copied()
    }

    fn neighbors_of(&self, pos: GridPos) -> Vec<AgentId> {
        let mut neighbors: Vec<AgentId> = self
            .neighborhood(pos)
            .into_iter()
            .filter_map(|cell| self.cells.get(&cell))
            .flat_map(|occupants| occupants.iter().copied())
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    fn neighborhood(&self, pos: GridPos) -> Vec<GridPos> {
        let mut cells = BTreeSet::new();
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = Self::offset(pos.x, dx, self.width, self.torus);
                let y = Self::offset(pos.y, dy, self.height, self.torus);
                if let (Some(x), Some(y)) = (x, y) {
                    let cell = GridPos::new(x, y);
                    // Tiny toroidal grids wrap back onto the center
                    if cell != pos {
                        cells.insert(cell);
                    }
                }
            }
        }
        cells.into_iter().collect()
    }

    fn cell_contents(&self, pos: GridPos) -> Vec<AgentId> {
        self.cells
            .get(&pos)
            .map(|occupants| occupants.iter().copied().collect())
            .unwrap_or_default()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Spatial index resource
#[derive(Resource)]
pub struct SpatialGrid(pub Box<dyn SpatialIndex>);

impl SpatialGrid {
    pub fn new(index: impl SpatialIndex + 'static) -> Self {
        Self(Box::new(index))
    }

    pub fn index_mut(&mut self) -> &mut dyn SpatialIndex {
        self.0.as_mut()
    }
}
