use alloc::vec::Vec;

use crate::geometry::{Coord, Rect};

/// Split `rect` into `tiles` contiguous pieces of `ceil(volume / tiles)` indices.
///
/// Pieces keep the global indices of `rect`. When the volume doesn't divide evenly the
/// trailing pieces are shorter, and may be empty when there are more tiles than indices.
///
/// # Panics
///
/// If `tiles` is zero.
pub fn tile(rect: Rect, tiles: usize) -> Vec<Rect> {
    assert!(tiles > 0, "Can't tile into zero pieces");

    let chunk = rect.volume().div_ceil(tiles).max(1) as Coord;

    (0..tiles as Coord)
        .map(|index| {
            let lo = rect.lo + index * chunk;
            let hi = (lo + chunk - 1).min(rect.hi);
            if lo > rect.hi {
                Rect::empty_at(rect.hi + 1)
            } else {
                Rect::new(lo, hi)
            }
        })
        .collect()
}

/// Shard that owns `point` when `launch_space` is tiled over `total_shards` shards.
///
/// # Panics
///
/// If `point` is outside of `launch_space` or `total_shards` is zero.
pub fn shard_of(point: Coord, launch_space: Rect, total_shards: usize) -> usize {
    assert!(launch_space.contains(point), "Point {point} outside of {launch_space}");
    let chunk = launch_space.volume().div_ceil(total_shards);
    ((point - launch_space.lo) as usize) / chunk
}

/// Points of `launch_space` owned by `shard`, inverse of [shard_of].
pub fn shard_points(shard: usize, launch_space: Rect, total_shards: usize) -> Rect {
    let size = launch_space.volume();
    let chunk = size.div_ceil(total_shards);
    let start = shard * chunk;
    let end = ((shard + 1) * chunk).min(size);

    if start >= end {
        return Rect::empty_at(launch_space.hi + 1);
    }

    Rect::new(
        launch_space.lo + start as Coord,
        launch_space.lo + end as Coord - 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_covers_rect_in_order() {
        let tiles = tile(Rect::new(0, 9), 3);

        assert_eq!(
            tiles,
            vec![Rect::new(0, 3), Rect::new(4, 7), Rect::new(8, 9)]
        );
    }

    #[test]
    fn tile_keeps_global_offsets() {
        let tiles = tile(Rect::new(10, 13), 2);

        assert_eq!(tiles, vec![Rect::new(10, 11), Rect::new(12, 13)]);
    }

    #[test]
    fn tile_pads_with_empty_pieces() {
        let tiles = tile(Rect::new(0, 1), 4);

        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0], Rect::new(0, 0));
        assert_eq!(tiles[1], Rect::new(1, 1));
        assert!(tiles[2].is_empty());
        assert!(tiles[3].is_empty());
    }

    #[test]
    fn tile_empty_rect_gives_empty_pieces() {
        let tiles = tile(Rect::with_len(0), 2);

        assert!(tiles.iter().all(Rect::is_empty));
    }

    #[test]
    fn shard_of_tiles_launch_space() {
        let space = Rect::new(0, 9);
        let shards: Vec<_> = space.points().map(|p| shard_of(p, space, 4)).collect();

        assert_eq!(shards, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 3]);
    }

    #[test]
    fn shard_points_inverts_shard_of() {
        let space = Rect::new(2, 12);
        for shard in 0..4 {
            let points = shard_points(shard, space, 4);
            for point in points.points() {
                assert_eq!(shard_of(point, space, 4), shard);
            }
        }
        let total: usize = (0..4).map(|s| shard_points(s, space, 4).volume()).sum();
        assert_eq!(total, space.volume());
    }

    #[test]
    fn shard_points_empty_when_more_shards_than_points() {
        assert!(shard_points(3, Rect::new(0, 1), 4).is_empty());
    }
}
