use crate::error::MapError;
use crate::grid::{Grid, Position};
use crate::node::Terrain;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Raw cost map: one terrain class value per cell, indexed `cells[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapData {
    pub cells: Vec<Vec<u8>>,
}

impl MapData {
    /// A map with every cell open.
    pub fn open(width: usize, height: usize) -> Self {
        MapData {
            cells: vec![vec![Terrain::Open.class(); width]; height],
        }
    }

    /// Parses a text map with one row per line.
    ///
    /// Values are separated by whitespace or commas. A line with no
    /// separators is read as one single-digit value per character. Blank
    /// lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut cells = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = index + 1;
            let row = if line.contains(|c: char| c.is_whitespace() || c == ',') {
                line.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|t| !t.is_empty())
                    .map(|token| parse_value(token, line_no))
                    .collect::<Result<Vec<u8>, MapError>>()?
            } else {
                line.chars()
                    .map(|c| {
                        c.to_digit(10).map(|d| d as u8).ok_or_else(|| MapError::Parse {
                            line: line_no,
                            token: c.to_string(),
                        })
                    })
                    .collect::<Result<Vec<u8>, MapError>>()?
            };
            cells.push(row);
        }

        let map = MapData { cells };
        map.validate()?;
        Ok(map)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, crate::error::SimulationError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Generates a random map. Walls become blocked cells and rough cells
    /// get one of the surcharged classes. Cells listed in `keep_clear` stay
    /// open. Placement gives up after a bounded number of attempts, so
    /// crowded maps may end up with fewer walls than requested.
    pub fn random<R: Rng>(
        width: usize,
        height: usize,
        num_walls: usize,
        num_rough: usize,
        keep_clear: &[Position],
        rng: &mut R,
    ) -> Self {
        let mut map = Self::open(width, height);
        if width == 0 || height == 0 {
            return map;
        }
        let rough = [Terrain::Light, Terrain::Medium, Terrain::Heavy];
        map.scatter(num_walls, keep_clear, rng, |_| Terrain::Blocked);
        map.scatter(num_rough, keep_clear, rng, |rng| {
            rough[rng.gen_range(0..rough.len())]
        });
        map
    }

    fn scatter<R: Rng>(
        &mut self,
        count: usize,
        keep_clear: &[Position],
        rng: &mut R,
        pick: impl Fn(&mut R) -> Terrain,
    ) {
        let (width, height) = (self.width(), self.height());
        // More than one placement per cell can never succeed.
        let count = count.min(width * height);
        let max_attempts = count.saturating_mul(3);
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < max_attempts {
            attempts += 1;
            let pos = Position {
                x: rng.gen_range(0..width),
                y: rng.gen_range(0..height),
            };
            if keep_clear.contains(&pos) || self.cells[pos.y][pos.x] != Terrain::Open.class() {
                continue;
            }
            self.cells[pos.y][pos.x] = pick(rng).class();
            placed += 1;
        }
    }

    fn validate(&self) -> Result<(), MapError> {
        let width = self.cells.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(MapError::Empty);
        }
        for (y, row) in self.cells.iter().enumerate() {
            if row.len() != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn to_grid(&self) -> Result<Grid, MapError> {
        Grid::build(&self.cells)
    }
}

fn parse_value(token: &str, line: usize) -> Result<u8, MapError> {
    token.parse::<u8>().map_err(|_| MapError::Parse {
        line,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parses_compact_rows() {
        let map = MapData::parse("000\n010\n002\n").unwrap();
        assert_eq!(map.cells, vec![vec![0, 0, 0], vec![0, 1, 0], vec![0, 0, 2]]);
    }

    #[test]
    fn parses_separated_rows_with_comments() {
        let text = "# corridor\n0, 0, 4\n\n1 0 3\n";
        let map = MapData::parse(text).unwrap();
        assert_eq!(map.cells, vec![vec![0, 0, 4], vec![1, 0, 3]]);
        assert_eq!((map.width(), map.height()), (3, 2));
    }

    #[test]
    fn reports_bad_tokens_with_line_numbers() {
        let err = MapData::parse("00\n0x\n").unwrap_err();
        assert_eq!(
            err,
            MapError::Parse {
                line: 2,
                token: "x".to_string()
            }
        );
        let err = MapData::parse("0 0\n0 -1\n").unwrap_err();
        assert_eq!(
            err,
            MapError::Parse {
                line: 2,
                token: "-1".to_string()
            }
        );
    }

    #[test]
    fn rejects_empty_and_ragged_text() {
        assert_eq!(MapData::parse("# nothing\n\n").unwrap_err(), MapError::Empty);
        assert!(matches!(
            MapData::parse("000\n00\n").unwrap_err(),
            MapError::Ragged { row: 1, .. }
        ));
    }

    #[test]
    fn unknown_classes_fail_at_grid_build() {
        let map = MapData::parse("07").unwrap();
        assert!(matches!(
            map.to_grid().unwrap_err(),
            MapError::UnknownTerrain { value: 7, .. }
        ));
    }

    #[test]
    fn random_maps_are_reproducible_and_respect_keep_clear() {
        let keep = [Position::new(0, 0), Position::new(9, 9)];
        let a = MapData::random(10, 10, 30, 20, &keep, &mut StdRng::seed_from_u64(7));
        let b = MapData::random(10, 10, 30, 20, &keep, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        for pos in keep {
            assert_eq!(a.cells[pos.y][pos.x], Terrain::Open.class());
        }
        let grid = a.to_grid().unwrap();
        assert!(grid.blocked_count() > 0);
        assert!(grid.blocked_count() <= 30);
    }

    #[test]
    fn huge_placement_counts_are_capped_by_the_map_size() {
        let keep = [Position::new(1, 1)];
        let mut rng = StdRng::seed_from_u64(1);
        let map = MapData::random(3, 3, usize::MAX, usize::MAX, &keep, &mut rng);
        assert_eq!(map.cells[1][1], Terrain::Open.class());
        assert!(map.to_grid().unwrap().blocked_count() <= 8);
    }
}
