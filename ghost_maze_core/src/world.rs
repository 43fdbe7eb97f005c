use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::{
    Direction, PixelPosition, Position, constants::PICKUP_RADIUS, ghost::GhostColor,
    map::{Grid, GridError},
};

/// How strongly a tile blocks movement. Ordered from least to most blocking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BlockType {
    #[default]
    NoBlock,
    /// Passable by ghosts only, e.g. the door of the ghost base.
    PartialBlock,
    Block,
}

/// Collectables lying on the maze floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Dot,
    PowerPellet,
}

/// Represents errors found while loading a map description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map string is empty.")]
    Empty,
    #[error("No home tile ('H') found in map.")]
    MissingHomeTile,
    #[error("Multiple home tiles ('H') found: ({}, {}) and ({}, {}).", .first.x, .first.y, .second.x, .second.y)]
    DuplicateHomeTile { first: Position, second: Position },
    #[error("No exit destinations ('P' or 'R') found in map.")]
    NoExitDestinations,
    #[error("No red ghost exit destinations ('R') found in map.")]
    NoRedExitDestinations,
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The tiles ghosts head for when they leave the base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitDestinations {
    shared: Vec<Position>,
    red: Vec<Position>,
}

impl ExitDestinations {
    pub fn add_shared(&mut self, position: Position) {
        self.shared.push(position);
    }

    /// Red destinations are always usable by the other ghosts as well.
    pub fn add_red(&mut self, position: Position) {
        self.red.push(position);
        self.shared.push(position);
    }

    pub fn shared(&self) -> &[Position] {
        &self.shared
    }

    pub fn red(&self) -> &[Position] {
        &self.red
    }

    pub fn for_color(&self, color: GhostColor) -> &[Position] {
        match color {
            GhostColor::Red => &self.red,
            _ => &self.shared,
        }
    }

    /// Picks one destination for `color` uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, color: GhostColor, rng: &mut R) -> Option<Position> {
        let destinations = self.for_color(color);
        if destinations.is_empty() {
            None
        } else {
            Some(destinations[rng.random_range(0..destinations.len())])
        }
    }
}

/// The maze: tile classifications, collectables and ghost base markers.
#[derive(Debug, Clone)]
pub struct World {
    tiles: Grid<Option<BlockType>>,
    items: Grid<Option<Item>>,
    home_tile: Position,
    exits: ExitDestinations,
    dots_left: usize,
}

impl World {
    /// Returns `true` if a tile exists at `position` and blocks no more than `max_block_type`.
    pub fn tile_validity(&self, position: Position, max_block_type: BlockType) -> bool {
        self.block_type(position)
            .is_some_and(|block_type| block_type <= max_block_type)
    }

    /// The classification of the tile at `position`, or `None` if there is no tile.
    pub fn block_type(&self, position: Position) -> Option<BlockType> {
        self.tiles.get(position).copied().flatten()
    }

    /// Pure coordinate arithmetic, no bounds checking.
    pub fn tile_in_direction(tile: Position, direction: Direction) -> Position {
        tile.step(direction)
    }

    /// Searches for a route from `from` to `to`, excluding `from` itself.
    ///
    /// The search is a greedy depth-first traversal with backtracking: at every tile the
    /// unvisited, non-blocking neighbours are tried closest-first (manhattan distance to `to`,
    /// ties kept in up, down, right, left order). The route is valid but not necessarily the
    /// shortest. An empty result means either `from == to` or that no route exists.
    pub fn path_search(&self, from: Position, to: Position) -> Vec<Position> {
        if self.block_type(from).is_none() || self.block_type(to).is_none() {
            trace!(?from, ?to, "path search endpoint has no tile");
            return Vec::new();
        }

        let mut visited = Grid::filled(self.tiles.width(), self.tiles.height(), false);
        visited[from] = true;
        if from == to {
            return Vec::new();
        }

        let mut path = Vec::new();
        // One frame per tile on the current route, holding the neighbours not yet tried.
        let mut stack = vec![self.search_candidates(from, to, &visited).into_iter()];

        while let Some(candidates) = stack.last_mut() {
            let Some(candidate) = candidates.next() else {
                stack.pop();
                path.pop();
                continue;
            };

            path.push(candidate);
            visited[candidate] = true;
            if candidate == to {
                trace!(?from, ?to, length = path.len(), "path found");
                return path;
            }

            let next = self.search_candidates(candidate, to, &visited);
            stack.push(next.into_iter());
        }

        trace!(?from, ?to, "no path");
        Vec::new()
    }

    /// Unvisited, non-blocking neighbours of `tile`, closest to `to` first.
    fn search_candidates(&self, tile: Position, to: Position, visited: &Grid<bool>) -> Vec<Position> {
        let mut candidates: Vec<Position> = Direction::SEARCH_ORDER
            .iter()
            .map(|direction| tile.step(*direction))
            .filter(|neighbour| {
                matches!(self.block_type(*neighbour), Some(block) if block != BlockType::Block)
            })
            .filter(|neighbour| visited.get(*neighbour).is_some_and(|seen| !seen))
            .collect();

        // Stable sort, so equal distances keep the enumeration order.
        candidates.sort_by_key(|neighbour| neighbour.manhattan_distance(&to));
        candidates
    }

    /// Removes and returns the item under `position` if it is within pickup range.
    pub fn collect_item_at(&mut self, position: PixelPosition) -> Option<Item> {
        let tile = position.nearest_tile();
        if position.distance(tile.to_pixel()) >= PICKUP_RADIUS {
            return None;
        }

        let item = self.items.get_mut(tile)?.take()?;
        if item == Item::Dot {
            self.dots_left -= 1;
        }
        Some(item)
    }

    pub fn dots_remaining(&self) -> bool {
        self.dots_left > 0
    }

    pub fn dots_left(&self) -> usize {
        self.dots_left
    }

    pub fn home_tile(&self) -> Position {
        self.home_tile
    }

    pub fn exits(&self) -> &ExitDestinations {
        &self.exits
    }

    pub fn tiles(&self) -> &Grid<Option<BlockType>> {
        &self.tiles
    }

    pub fn items(&self) -> &Grid<Option<Item>> {
        &self.items
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }
}

/// Loads a world from a textual map, one character per tile.
///
/// `x` is a wall, `-` a ghost-only door, anything else open floor. On top of that, `.` places a
/// dot, `o` a power pellet, `H` marks the ghost home tile, `P` an exit destination for every
/// ghost and `R` an exit destination for the red ghost (also shared with the others).
/// Rows may have different lengths; positions past the end of a row have no tile.
pub fn load_world_from_string(map_string: &str) -> Result<World, MapError> {
    let lines: Vec<&str> = map_string
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();

    let height = lines.len();
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    if width == 0 {
        return Err(MapError::Empty);
    }

    let mut tiles = Grid::filled(width, height, None);
    let mut items = Grid::filled(width, height, None);
    let mut exits = ExitDestinations::default();
    let mut home_tile: Option<Position> = None;
    let mut dots_left = 0;

    for (y, line) in lines.iter().enumerate() {
        for (x, code) in line.chars().enumerate() {
            let pos = Position { x, y };
            let block_type = match code {
                'x' => BlockType::Block,
                '-' => BlockType::PartialBlock,
                _ => BlockType::NoBlock,
            };
            tiles.set(pos, Some(block_type))?;

            match code {
                '.' => {
                    items.set(pos, Some(Item::Dot))?;
                    dots_left += 1;
                }
                'o' => items.set(pos, Some(Item::PowerPellet))?,
                'H' => {
                    if let Some(first) = home_tile {
                        return Err(MapError::DuplicateHomeTile { first, second: pos });
                    }
                    home_tile = Some(pos);
                }
                'R' => exits.add_red(pos),
                'P' => exits.add_shared(pos),
                _ => {}
            }
        }
    }

    let home_tile = home_tile.ok_or(MapError::MissingHomeTile)?;
    if exits.shared().is_empty() {
        return Err(MapError::NoExitDestinations);
    }
    if exits.red().is_empty() {
        return Err(MapError::NoRedExitDestinations);
    }

    info!(
        width,
        height,
        dots = dots_left,
        exits = exits.shared().len(),
        "map loaded"
    );

    Ok(World {
        tiles,
        items,
        home_tile,
        exits,
        dots_left,
    })
}
