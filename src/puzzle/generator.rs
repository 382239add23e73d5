//! Deterministic board generation

use enum_map::enum_map;

use crate::{
    constants::board::{COOP_BATCHES, VERSUS_DEATH_TILES, VERSUS_TEAM_TILES},
    team::{Mode, TEAMS, Team},
};

use super::{Classification, GenerateError, Owner, Puzzle, Tile, prng::Mulberry32};

/// Removes a uniformly drawn tile index from the unassigned set
fn draw_blank(prng: &mut Mulberry32, unassigned: &mut Vec<usize>) -> Result<usize, GenerateError> {
    if unassigned.is_empty() {
        return Err(GenerateError::NoBlankTiles);
    }
    let position = prng.index(unassigned.len());
    Ok(unassigned.remove(position))
}

/// Generates the board for a room
///
/// This is a pure function of its arguments: the same seed, mode, tile count
/// and pool always produce the same puzzle, on every client.
///
/// # Arguments
///
/// * `seed` - The setup event's timestamp
/// * `mode` - The rule set the board is classified for
/// * `tile_count` - Number of tiles on the board
/// * `pool` - Candidate words, in the order the selected word lists provide them
///
/// # Errors
///
/// * `GenerateError::PoolExhausted` - The pool has fewer words than tiles
/// * `GenerateError::NoBlankTiles` - `tile_count` is too small for the
///   classification tables
pub fn generate(
    seed: u64,
    mode: Mode,
    tile_count: usize,
    pool: &[String],
) -> Result<Puzzle, GenerateError> {
    if pool.len() < tile_count {
        return Err(GenerateError::PoolExhausted {
            needed: tile_count,
            available: pool.len(),
        });
    }

    let mut prng = Mulberry32::new(seed);
    let mut words = pool.to_vec();
    let mut tiles = Vec::with_capacity(tile_count);
    for _ in 0..tile_count {
        let word = words.remove(prng.index(words.len()));
        tiles.push(Tile {
            word,
            classification: Classification::blank(mode),
        });
    }

    let mut unassigned: Vec<usize> = (0..tile_count).collect();

    let first = match mode {
        Mode::Coop => {
            for (count, red, blue) in COOP_BATCHES {
                for _ in 0..count {
                    let index = draw_blank(&mut prng, &mut unassigned)?;
                    tiles[index].classification = Classification::Coop(enum_map! {
                        Team::Red => red,
                        Team::Blue => blue,
                    });
                }
            }
            prng.index(TEAMS.len())
        }
        Mode::Versus => {
            let first = prng.index(TEAMS.len());
            let mut player = first;
            for _ in 0..VERSUS_TEAM_TILES {
                let index = draw_blank(&mut prng, &mut unassigned)?;
                tiles[index].classification =
                    Classification::Versus(Some(Owner::from(TEAMS[player])));
                player = (player + 1) % TEAMS.len();
            }
            for _ in 0..VERSUS_DEATH_TILES {
                let index = draw_blank(&mut prng, &mut unassigned)?;
                tiles[index].classification = Classification::Versus(Some(Owner::Death));
            }
            first
        }
    };

    log::debug!(
        "generated {mode:?} board of {tile_count} tiles from {} words, first team {}",
        pool.len(),
        TEAMS[first]
    );

    Ok(Puzzle { mode, tiles, first })
}
