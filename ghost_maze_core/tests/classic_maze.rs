use std::collections::HashSet;

use ghost_maze_core::{
    Direction, Position,
    avatar::Avatar,
    coordinator::GhostCoordinator,
    game::{FrameOutcome, Game, GameStatus},
    ghost::{Ghost, GhostColor},
    movement::Agent,
    world::{BlockType, World, load_world_from_string},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

const CLASSIC: &str = include_str!("../../maps/classic.txt");

fn classic() -> World {
    load_world_from_string(CLASSIC).expect("bundled map loads")
}

#[test]
fn classic_map_markers() {
    let world = classic();
    assert_eq!((world.width(), world.height()), (30, 30));
    assert_eq!(world.home_tile(), Position::new(14, 12));
    assert_eq!(
        world.exits().red(),
        &[Position::new(13, 8), Position::new(16, 8)]
    );
    assert_eq!(
        world.exits().shared(),
        &[
            Position::new(13, 8),
            Position::new(16, 8),
            Position::new(10, 10),
            Position::new(19, 10)
        ]
    );
    assert_eq!(
        world.block_type(Position::new(14, 11)),
        Some(BlockType::PartialBlock)
    );
    for tile in [(0, 13), (1, 13), (2, 13), (27, 13), (28, 13), (29, 13)] {
        assert!(world.tile_validity(Position::new(tile.0, tile.1), BlockType::NoBlock));
    }
    assert!(world.dots_remaining());
}

#[test]
fn every_open_tile_can_reach_home() {
    let world = classic();
    let home = world.home_tile();

    for (from, block) in world.tiles().enumerate() {
        if !matches!(block, Some(BlockType::NoBlock | BlockType::PartialBlock)) {
            continue;
        }
        let path = world.path_search(from, home);
        if from == home {
            assert!(path.is_empty());
            continue;
        }

        assert_eq!(path.last(), Some(&home), "no route from {:?}", from);
        let mut seen = HashSet::new();
        let mut previous = from;
        for tile in &path {
            assert!(seen.insert(*tile));
            assert_ne!(world.block_type(*tile), Some(BlockType::Block));
            assert_eq!(previous.manhattan_distance(tile), 1);
            previous = *tile;
        }
    }
}

#[test]
fn avatar_wraps_through_the_left_tunnel() {
    let world = classic();
    let mut avatar = Avatar::with_spawn(Position::new(1, 13).to_pixel());
    assert_eq!(avatar.direction(), Direction::Left);

    let mut frames = 0;
    while avatar.current_tile() == Position::new(1, 13) && frames < 20 {
        avatar.update(16, &world);
        frames += 1;
    }
    assert_eq!(avatar.current_tile(), Position::new(27, 13));
    assert_eq!(avatar.position(), Position::new(27, 13).to_pixel());
    assert_eq!(avatar.direction(), Direction::Left);
}

#[test]
fn avatar_wraps_through_the_right_tunnel() {
    let world = classic();
    let mut avatar = Avatar::with_spawn(Position::new(28, 13).to_pixel());
    assert!(avatar.set_direction(Direction::Right, &world));

    let mut frames = 0;
    while avatar.current_tile() == Position::new(28, 13) && frames < 20 {
        avatar.update(16, &world);
        frames += 1;
    }
    assert_eq!(avatar.current_tile(), Position::new(2, 13));
}

#[test]
fn ghosts_leave_the_base_and_stay_off_walls() {
    let world = classic();
    let mut rng = StdRng::seed_from_u64(42);
    let mut coordinator = GhostCoordinator::new();
    let mut ghosts = GhostColor::ALL.map(Ghost::new);
    let mut left_base = [false; 4];

    for _ in 0..2_000 {
        coordinator.update_ghosts(16, &mut ghosts, &world, &mut rng);
        for (index, ghost) in ghosts.iter().enumerate() {
            let tile = ghost.current_tile();
            assert!(
                matches!(
                    world.block_type(tile),
                    Some(BlockType::NoBlock | BlockType::PartialBlock)
                ),
                "{:?} ghost on {:?}",
                ghost.color(),
                tile
            );
            if tile.y < 11 {
                left_base[index] = true;
            }
        }
        if left_base.iter().all(|left| *left) {
            break;
        }
    }
    assert_eq!(left_base, [true; 4]);
}

#[test]
fn long_game_keeps_its_invariants() {
    let mut game = Game::new(classic(), 9);
    let mut input_rng = StdRng::seed_from_u64(99);
    let mut score = 0;
    let mut lives = game.lives();
    let mut finished = false;

    for frame in 0..6_000 {
        let input = (frame % 12 == 0)
            .then(|| Direction::SEARCH_ORDER[input_rng.random_range(0..4)]);
        let outcome = game.step(16, input);

        assert!(game.score() >= score);
        assert!(game.lives() <= lives);
        score = game.score();
        lives = game.lives();

        let world = game.world();
        assert!(world.tile_validity(game.avatar().current_tile(), BlockType::NoBlock));
        for ghost in game.ghosts() {
            assert_ne!(world.block_type(ghost.current_tile()), Some(BlockType::Block));
        }

        match outcome {
            FrameOutcome::LevelCleared | FrameOutcome::GameOver => finished = true,
            _ => assert!(!finished, "game resumed after it ended"),
        }
    }

    if game.status() == GameStatus::Playing {
        assert!(game.lives() > 0);
    }
}

#[test]
fn same_seed_and_input_replay_identically() {
    let inputs = [
        Some(Direction::Left),
        None,
        Some(Direction::Up),
        None,
        Some(Direction::Right),
        Some(Direction::Down),
    ];
    let run = || {
        let mut game = Game::new(classic(), 2024);
        for frame in 0..1_500 {
            game.step(16, inputs[frame % inputs.len()]);
        }
        game.snapshot()
    };
    assert_eq!(run(), run());
}
