//! Board topologies
//!
//! A topology describes the cells of a board, which cells are adjacent, which
//! triples of cells form mills, how cells are named (`a1`, `d7`, ...) and which
//! permutations of the cells are symmetries of the board.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use super::board::{MAX_POSITIONS, Position};
use crate::error::MillError;

/// Supported board layouts
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardLayout {
    Standard,
    Morabaraba,
    Moebius,
    Windmill,
    Sunmill,
    SixMen,
    SevenMen,
    SmallSquare,
    SmallSquareDiagonal,
    SmallTriangle,
    Polygon3,
    Polygon5,
    Polygon6,
}

impl BoardLayout {
    pub const ALL: [BoardLayout; 13] = [
        BoardLayout::Standard,
        BoardLayout::Morabaraba,
        BoardLayout::Moebius,
        BoardLayout::Windmill,
        BoardLayout::Sunmill,
        BoardLayout::SixMen,
        BoardLayout::SevenMen,
        BoardLayout::SmallSquare,
        BoardLayout::SmallSquareDiagonal,
        BoardLayout::SmallTriangle,
        BoardLayout::Polygon3,
        BoardLayout::Polygon5,
        BoardLayout::Polygon6,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BoardLayout::Standard => "standard",
            BoardLayout::Morabaraba => "morabaraba",
            BoardLayout::Moebius => "moebius",
            BoardLayout::Windmill => "windmill",
            BoardLayout::Sunmill => "sunmill",
            BoardLayout::SixMen => "six-men",
            BoardLayout::SevenMen => "seven-men",
            BoardLayout::SmallSquare => "small-square",
            BoardLayout::SmallSquareDiagonal => "small-square-diagonal",
            BoardLayout::SmallTriangle => "small-triangle",
            BoardLayout::Polygon3 => "polygon3",
            BoardLayout::Polygon5 => "polygon5",
            BoardLayout::Polygon6 => "polygon6",
        }
    }
}

impl fmt::Display for BoardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoardLayout {
    type Err = MillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoardLayout::ALL
            .into_iter()
            .find(|layout| layout.name() == s)
            .ok_or_else(|| MillError::UnknownLayout(s.to_string()))
    }
}

/// The two partner cells of a mill through some cell
pub type MillPartners = [Position; 2];

/// Static description of a board
#[derive(Debug)]
pub struct Topology {
    layout: BoardLayout,
    neighbors: Vec<SmallVec<[Position; 8]>>,
    mills: Vec<[Position; 3]>,
    mills_through: Vec<SmallVec<[MillPartners; 4]>>,
    names: Vec<String>,
    symmetries: Vec<Vec<Position>>,
}

impl Topology {
    pub fn new(layout: BoardLayout) -> Self {
        let (neighbors, mills, names) = match layout {
            BoardLayout::Polygon3 => polygon(3),
            BoardLayout::Polygon5 => polygon(5),
            BoardLayout::Polygon6 => polygon(6),
            grid => grid_table(grid).expand(),
        };
        debug_assert!(neighbors.len() <= MAX_POSITIONS);

        let mut mills_through = vec![SmallVec::new(); neighbors.len()];
        for mill in &mills {
            for n in 0..3 {
                mills_through[mill[n] as usize].push([mill[(n + 1) % 3], mill[(n + 2) % 3]]);
            }
        }

        let mut topology = Topology {
            layout,
            neighbors,
            mills,
            mills_through,
            names,
            symmetries: Vec::new(),
        };
        topology.symmetries = topology.find_symmetries();
        topology
    }

    #[inline]
    pub fn layout(&self) -> BoardLayout {
        self.layout
    }

    #[inline]
    pub fn n_positions(&self) -> usize {
        self.neighbors.len()
    }

    pub fn positions(&self) -> std::ops::Range<Position> {
        0..self.n_positions() as Position
    }

    #[inline]
    pub fn neighbors(&self, pos: Position) -> &[Position] {
        &self.neighbors[pos as usize]
    }

    #[inline]
    pub fn mills(&self) -> &[[Position; 3]] {
        &self.mills
    }

    /// For each mill containing `pos`, the other two cells of that mill
    #[inline]
    pub fn mills_through(&self, pos: Position) -> &[MillPartners] {
        &self.mills_through[pos as usize]
    }

    pub fn name(&self, pos: Position) -> &str {
        &self.names[pos as usize]
    }

    pub fn position_by_name(&self, name: &str) -> Option<Position> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|p| p as Position)
    }

    /// All adjacency preserving permutations, identity included.
    /// `perm[p]` is the cell that `p` maps to.
    pub fn symmetries(&self) -> &[Vec<Position>] {
        &self.symmetries
    }

    fn find_symmetries(&self) -> Vec<Vec<Position>> {
        let n = self.n_positions();
        let mut found = Vec::new();
        let mut perm = vec![0 as Position; n];
        let mut used = vec![false; n];
        self.extend_symmetry(&mut perm, &mut used, 0, &mut found);
        found
    }

    fn extend_symmetry(
        &self,
        perm: &mut [Position],
        used: &mut [bool],
        pos: usize,
        found: &mut Vec<Vec<Position>>,
    ) {
        if pos == self.n_positions() {
            found.push(perm.to_vec());
            return;
        }

        let src = &self.neighbors[pos];
        for target in 0..self.n_positions() {
            if used[target] {
                continue;
            }
            let dst = &self.neighbors[target];
            if src.len() != dst.len() {
                continue;
            }
            // every neighbor mapped so far must land next to `target`
            let compatible = src
                .iter()
                .filter(|&&s| (s as usize) < pos)
                .all(|&s| dst.contains(&perm[s as usize]));
            if compatible {
                used[target] = true;
                perm[pos] = target as Position;
                self.extend_symmetry(perm, used, pos + 1, found);
                used[target] = false;
            }
        }
    }
}

type Expanded = (
    Vec<SmallVec<[Position; 8]>>,
    Vec<[Position; 3]>,
    Vec<String>,
);

struct GridTable {
    neighbors: &'static [&'static [Position]],
    mills: &'static [[Position; 3]],
    geometry: &'static [(u8, u8)],
    x_coords: &'static [u8],
    y_coords: &'static [u8],
}

impl GridTable {
    fn expand(&self) -> Expanded {
        let neighbors = self
            .neighbors
            .iter()
            .map(|n| SmallVec::from_slice(n))
            .collect();
        let names = self
            .geometry
            .iter()
            .map(|&(x, y)| {
                let col = self.x_coords.iter().position(|&c| c == x).unwrap_or(0);
                let row = self.y_coords.iter().position(|&c| c == y).unwrap_or(0);
                format!("{}{}", (b'a' + col as u8) as char, (b'1' + row as u8) as char)
            })
            .collect();
        (neighbors, self.mills.to_vec(), names)
    }
}

/// Three concentric rings of `corners`-gons; cells alternate corner, edge middle.
fn polygon(corners: usize) -> Expanded {
    let ring_len = 2 * corners;
    let mut neighbors = Vec::with_capacity(3 * ring_len);
    let mut names = Vec::with_capacity(3 * ring_len);

    for ring in 0..3 {
        for c in 0..ring_len {
            let p = ring * ring_len + c;
            let mut v: SmallVec<[Position; 8]> = SmallVec::new();
            v.push(((c + 1) % ring_len + ring * ring_len) as Position);
            v.push(((c + ring_len - 1) % ring_len + ring * ring_len) as Position);
            if c % 2 == 1 {
                if ring != 2 {
                    v.push((p + ring_len) as Position);
                }
                if ring != 0 {
                    v.push((p - ring_len) as Position);
                }
            }
            neighbors.push(v);
            names.push(format!("{}{}", (b'a' + c as u8) as char, (b'1' + ring as u8) as char));
        }
    }

    let mut mills = Vec::with_capacity(4 * corners);
    for ring in 0..3 {
        let base = ring * ring_len;
        for c in 0..corners {
            mills.push([
                (base + 2 * c) as Position,
                (base + 2 * c + 1) as Position,
                (base + (2 * c + 2) % ring_len) as Position,
            ]);
        }
    }
    for c in 0..corners {
        let spoke = 2 * c + 1;
        mills.push([
            spoke as Position,
            (spoke + ring_len) as Position,
            (spoke + 2 * ring_len) as Position,
        ]);
    }

    (neighbors, mills, names)
}

fn grid_table(layout: BoardLayout) -> &'static GridTable {
    match layout {
        BoardLayout::Standard => &STANDARD,
        BoardLayout::Morabaraba => &MORABARABA,
        BoardLayout::Moebius => &MOEBIUS,
        BoardLayout::Windmill => &WINDMILL,
        BoardLayout::Sunmill => &SUNMILL,
        BoardLayout::SixMen => &SIX_MEN,
        BoardLayout::SevenMen => &SEVEN_MEN,
        BoardLayout::SmallSquare => &SMALL_SQUARE,
        BoardLayout::SmallSquareDiagonal => &SMALL_SQUARE_DIAGONAL,
        BoardLayout::SmallTriangle => &SMALL_TRIANGLE,
        BoardLayout::Polygon3 | BoardLayout::Polygon5 | BoardLayout::Polygon6 => {
            unreachable!("polygon boards are generated")
        }
    }
}

const COORDS_5: &[u8] = &[0, 1, 2, 3, 4];
const COORDS_7: &[u8] = &[0, 1, 2, 3, 4, 5, 6];
const COORDS_9: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7, 8];
const COORDS_SMALL: &[u8] = &[1, 3, 5];

const STANDARD_GEOMETRY: &[(u8, u8)] = &[
    (0, 0), (3, 0), (6, 0),
    (1, 1), (3, 1), (5, 1),
    (2, 2), (3, 2), (4, 2),
    (0, 3), (1, 3), (2, 3), (4, 3), (5, 3), (6, 3),
    (2, 4), (3, 4), (4, 4),
    (1, 5), (3, 5), (5, 5),
    (0, 6), (3, 6), (6, 6),
];

const STANDARD_MILLS: &[[Position; 3]] = &[
    [0, 1, 2], [3, 4, 5], [6, 7, 8],
    [9, 10, 11], [12, 13, 14], [15, 16, 17],
    [18, 19, 20], [21, 22, 23], [0, 9, 21],
    [3, 10, 18], [6, 11, 15], [1, 4, 7],
    [16, 19, 22], [8, 12, 17], [5, 13, 20],
    [2, 14, 23],
];

static STANDARD: GridTable = GridTable {
    neighbors: &[
        &[1, 9], &[0, 2, 4], &[1, 14],
        &[4, 10], &[1, 3, 5, 7], &[4, 13],
        &[7, 11], &[4, 6, 8], &[7, 12],
        &[0, 10, 21], &[3, 9, 11, 18], &[6, 10, 15],
        &[8, 13, 17], &[5, 12, 14, 20], &[2, 13, 23],
        &[11, 16], &[15, 17, 19], &[12, 16],
        &[10, 19], &[16, 18, 20, 22], &[13, 19],
        &[9, 22], &[19, 21, 23], &[14, 22],
    ],
    mills: STANDARD_MILLS,
    geometry: STANDARD_GEOMETRY,
    x_coords: COORDS_7,
    y_coords: COORDS_7,
};

static MORABARABA: GridTable = GridTable {
    neighbors: &[
        &[1, 9, 3], &[0, 2, 4], &[1, 14, 5],
        &[4, 10, 0, 6], &[1, 3, 5, 7], &[4, 13, 2, 8],
        &[7, 11, 3], &[4, 6, 8], &[7, 12, 5],
        &[0, 10, 21], &[3, 9, 11, 18], &[6, 10, 15],
        &[8, 13, 17], &[5, 12, 14, 20], &[2, 13, 23],
        &[11, 16, 18], &[15, 17, 19], &[12, 16, 20],
        &[10, 19, 15, 21], &[16, 18, 20, 22], &[13, 19, 17, 23],
        &[9, 22, 18], &[19, 21, 23], &[14, 22, 20],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5], [6, 7, 8],
        [9, 10, 11], [12, 13, 14], [15, 16, 17],
        [18, 19, 20], [21, 22, 23], [0, 9, 21],
        [3, 10, 18], [6, 11, 15], [1, 4, 7],
        [16, 19, 22], [8, 12, 17], [5, 13, 20],
        [2, 14, 23],
        [0, 3, 6], [2, 5, 8], [15, 18, 21], [17, 20, 23],
    ],
    geometry: STANDARD_GEOMETRY,
    x_coords: COORDS_7,
    y_coords: COORDS_7,
};

static MOEBIUS: GridTable = GridTable {
    neighbors: &[
        &[1, 9], &[0, 2, 4], &[1, 12],
        &[4, 10], &[1, 3, 5, 7], &[4, 13],
        &[7, 11], &[4, 6, 8], &[7, 14],
        &[0, 10, 21], &[3, 9, 11, 18], &[6, 10, 15],
        &[2, 13, 17], &[5, 12, 14, 20], &[8, 13, 23],
        &[11, 16], &[15, 17, 19], &[12, 16],
        &[10, 19], &[16, 18, 20, 22], &[13, 19],
        &[9, 22], &[19, 21, 23], &[14, 22],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5], [6, 7, 8],
        [9, 10, 11], [12, 13, 14], [15, 16, 17],
        [18, 19, 20], [21, 22, 23], [0, 9, 21],
        [3, 10, 18], [6, 11, 15], [1, 4, 7],
        [16, 19, 22], [2, 12, 17], [5, 13, 20],
        [8, 14, 23],
    ],
    geometry: &[
        (0, 0), (3, 0), (4, 0),
        (1, 1), (3, 1), (5, 1),
        (2, 2), (3, 2), (6, 2),
        (0, 3), (1, 3), (2, 3), (4, 3), (5, 3), (6, 3),
        (2, 4), (3, 4), (4, 4),
        (1, 5), (3, 5), (5, 5),
        (0, 6), (3, 6), (6, 6),
    ],
    x_coords: COORDS_7,
    y_coords: COORDS_7,
};

static WINDMILL: GridTable = GridTable {
    neighbors: &[
        &[3, 12], &[2, 4], &[1, 3, 5],
        &[0, 2, 6, 11], &[1, 5, 7, 15], &[2, 4, 6, 8],
        &[3, 5, 10], &[4, 8, 16], &[5, 7, 9],
        &[8, 13, 14], &[6, 11, 14], &[3, 10, 12, 20],
        &[0, 11, 23], &[9, 17, 18], &[9, 10, 18],
        &[4, 16, 27], &[7, 15, 17, 24], &[13, 16, 21],
        &[13, 14, 19], &[18, 20, 22], &[11, 19, 23],
        &[17, 22, 24], &[19, 21, 23, 25], &[12, 20, 22, 26],
        &[16, 21, 25, 27], &[22, 24, 26], &[23, 25],
        &[15, 24],
    ],
    mills: &[
        [1, 2, 3], [4, 5, 6], [7, 8, 9],
        [10, 11, 12], [15, 16, 17], [18, 19, 20],
        [21, 22, 23], [24, 25, 26],
        [0, 12, 23], [3, 11, 20], [6, 10, 14],
        [19, 22, 25], [2, 5, 8], [13, 17, 21],
        [7, 16, 24], [4, 15, 27],
        [1, 4, 7], [0, 3, 6],
        [21, 24, 27], [20, 23, 26],
    ],
    geometry: &[
        (7, 0), (0, 1), (3, 1), (6, 1), (1, 2),
        (3, 2), (5, 2), (2, 3), (3, 3), (4, 3),
        (5, 3), (6, 3), (7, 3), (3, 4), (5, 4),
        (1, 5), (2, 5), (3, 5), (4, 5), (5, 5),
        (6, 5), (3, 6), (5, 6), (7, 6), (2, 7),
        (5, 7), (8, 7), (1, 8),
    ],
    x_coords: COORDS_9,
    y_coords: COORDS_9,
};

static SUNMILL: GridTable = GridTable {
    neighbors: &[
        &[1, 3], &[0, 2, 4], &[1, 5],
        &[0, 4, 6, 29], &[1, 3, 5, 7], &[2, 4, 11],
        &[3, 7, 31], &[4, 6, 14],
        &[9, 11], &[8, 10, 12], &[9, 13],
        &[8, 12, 14, 5], &[9, 11, 13, 15], &[10, 12, 19],
        &[11, 15, 7], &[12, 14, 22],
        &[17, 19], &[16, 18, 20], &[17, 21],
        &[16, 20, 22, 13], &[17, 19, 21, 23], &[18, 20, 27],
        &[19, 23, 15], &[20, 22, 30],
        &[25, 27], &[24, 26, 28], &[25, 29],
        &[24, 28, 30, 21], &[25, 27, 29, 31], &[26, 28, 3],
        &[27, 31, 23], &[28, 30, 6],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5], [31, 6, 7],
        [0, 3, 6], [1, 4, 7], [2, 5, 11],
        [8, 9, 10], [11, 12, 13], [7, 14, 15],
        [8, 11, 14], [9, 12, 15], [10, 13, 19],
        [16, 17, 18], [19, 20, 21], [15, 22, 23],
        [16, 19, 22], [17, 20, 23], [18, 21, 27],
        [24, 25, 26], [27, 28, 29], [23, 30, 31],
        [24, 27, 30], [25, 28, 31], [26, 29, 3],
    ],
    geometry: &[
        (1, 0), (2, 0), (3, 0),
        (2, 1), (3, 1), (4, 1),
        (3, 2), (4, 2),
        (6, 1), (6, 2), (6, 3),
        (5, 2), (5, 3), (5, 4),
        (4, 3), (4, 4),
        (5, 6), (4, 6), (3, 6),
        (4, 5), (3, 5), (2, 5),
        (3, 4), (2, 4),
        (0, 5), (0, 4), (0, 3),
        (1, 4), (1, 3), (1, 2),
        (2, 3), (2, 2),
    ],
    x_coords: COORDS_7,
    y_coords: COORDS_7,
};

static SIX_MEN: GridTable = GridTable {
    neighbors: &[
        &[1, 6], &[0, 2, 4], &[1, 9],
        &[4, 7], &[1, 3, 5], &[4, 8],
        &[0, 7, 13], &[3, 6, 10], &[5, 9, 12], &[2, 8, 15],
        &[7, 11], &[10, 12, 14], &[8, 11],
        &[6, 14], &[11, 13, 15], &[9, 14],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5],
        [10, 11, 12], [13, 14, 15],
        [0, 6, 13], [3, 7, 10],
        [5, 8, 12], [2, 9, 15],
    ],
    geometry: &[
        (0, 0), (2, 0), (4, 0),
        (1, 1), (2, 1), (3, 1),
        (0, 2), (1, 2), (3, 2), (4, 2),
        (1, 3), (2, 3), (3, 3),
        (0, 4), (2, 4), (4, 4),
    ],
    x_coords: COORDS_5,
    y_coords: COORDS_5,
};

static SEVEN_MEN: GridTable = GridTable {
    neighbors: &[
        &[1, 6], &[0, 2, 4], &[1, 10],
        &[4, 7], &[1, 3, 5, 8], &[4, 9],
        &[0, 7, 14], &[3, 6, 11, 8], &[4, 7, 9, 12], &[5, 8, 10, 13], &[2, 9, 16],
        &[7, 12], &[8, 11, 13, 15], &[9, 12],
        &[6, 15], &[12, 14, 16], &[10, 15],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5],
        [11, 12, 13], [14, 15, 16],
        [0, 6, 14], [3, 7, 11],
        [5, 9, 13], [2, 10, 16],
        [1, 4, 8], [4, 8, 12], [8, 12, 15],
        [6, 7, 8], [7, 8, 9], [8, 9, 10],
    ],
    geometry: &[
        (0, 0), (2, 0), (4, 0),
        (1, 1), (2, 1), (3, 1),
        (0, 2), (1, 2), (2, 2), (3, 2), (4, 2),
        (1, 3), (2, 3), (3, 3),
        (0, 4), (2, 4), (4, 4),
    ],
    x_coords: COORDS_5,
    y_coords: COORDS_5,
};

const SMALL_SQUARE_GEOMETRY: &[(u8, u8)] = &[
    (1, 1), (3, 1), (5, 1),
    (1, 3), (3, 3), (5, 3),
    (1, 5), (3, 5), (5, 5),
];

static SMALL_SQUARE: GridTable = GridTable {
    neighbors: &[
        &[1, 3], &[0, 2, 4], &[1, 5],
        &[0, 4, 6], &[1, 3, 5, 7], &[2, 4, 8],
        &[3, 7], &[4, 6, 8], &[5, 7],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5], [6, 7, 8],
        [0, 3, 6], [1, 4, 7], [2, 5, 8],
    ],
    geometry: SMALL_SQUARE_GEOMETRY,
    x_coords: COORDS_SMALL,
    y_coords: COORDS_SMALL,
};

static SMALL_SQUARE_DIAGONAL: GridTable = GridTable {
    neighbors: &[
        &[1, 3, 4], &[0, 2, 4], &[1, 4, 5],
        &[0, 4, 6], &[0, 1, 2, 3, 5, 6, 7, 8], &[2, 4, 8],
        &[3, 4, 7], &[4, 6, 8], &[4, 5, 7],
    ],
    mills: &[
        [0, 1, 2], [3, 4, 5], [6, 7, 8],
        [0, 3, 6], [1, 4, 7], [2, 5, 8],
        [0, 4, 8], [2, 4, 6],
    ],
    geometry: SMALL_SQUARE_GEOMETRY,
    x_coords: COORDS_SMALL,
    y_coords: COORDS_SMALL,
};

static SMALL_TRIANGLE: GridTable = GridTable {
    neighbors: &[
        &[1, 2, 3],
        &[0, 2, 4], &[0, 1, 3, 5], &[0, 2, 6],
        &[1, 5], &[2, 4, 6], &[3, 5],
    ],
    mills: &[
        [0, 1, 4], [0, 2, 5], [0, 3, 6],
        [1, 2, 3], [4, 5, 6],
    ],
    geometry: &[
        (3, 2),
        (2, 3), (3, 3), (4, 3),
        (1, 4), (3, 4), (5, 4),
    ],
    x_coords: &[1, 2, 3, 4, 5],
    y_coords: &[2, 3, 4],
};
