use crate::common::defs::*;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Grid cell. `x` is the column and `y` the row, rows grow downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

impl Add<Action> for Coord {
    type Output = Coord;

    /// Saturates at the `i32` range, the grid clamps the rest.
    fn add(self, a: Action) -> Coord {
        Coord::new(self.x.saturating_add(a.dx), self.y.saturating_add(a.dy))
    }
}

/// Displacement applied to the agent's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Action {
    pub dx: i32,
    pub dy: i32,
}

impl Action {
    pub const DOWN: Action = Action::new(0, 1);
    pub const RIGHT: Action = Action::new(1, 0);
    pub const UP: Action = Action::new(0, -1);
    pub const LEFT: Action = Action::new(-1, 0);
    pub const STAY: Action = Action::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Down, right, up, left, stay.
    pub fn standard() -> Vec<Action> {
        vec![
            Action::DOWN,
            Action::RIGHT,
            Action::UP,
            Action::LEFT,
            Action::STAY,
        ]
    }

    pub fn is_stay(&self) -> bool {
        *self == Action::STAY
    }
}

impl From<(i32, i32)> for Action {
    fn from((dx, dy): (i32, i32)) -> Self {
        Self { dx, dy }
    }
}

impl From<Action> for (i32, i32) {
    fn from(a: Action) -> Self {
        (a.dx, a.dy)
    }
}

/// Rectangular extent of a grid and the row-major cell numbering over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub width: usize,
    pub height: usize,
}

impl GridShape {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn n_cells(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as usize) < self.width && (c.y as usize) < self.height
    }

    /// `y * width + x`, `None` outside the grid.
    pub fn index_of(&self, c: Coord) -> Option<Discrete> {
        self.contains(c).then(|| c.y as usize * self.width + c.x as usize)
    }

    pub fn coord_of(&self, s: Discrete) -> Option<Coord> {
        (s < self.n_cells()).then(|| Coord::new((s % self.width) as i32, (s / self.width) as i32))
    }

    /// Projects `c` onto the grid axis by axis.
    pub fn clamp(&self, c: Coord) -> Coord {
        Coord::new(
            c.x.clamp(0, self.width as i32 - 1),
            c.y.clamp(0, self.height as i32 - 1),
        )
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.n_cells()).filter_map(|s| self.coord_of(s))
    }
}
