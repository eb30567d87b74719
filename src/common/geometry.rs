//! Toolkit-agnostic points and rectangles used for hit-testing and
//! highlight geometry.

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn top_half(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height / 2.0)
    }

    pub fn bottom_half(&self) -> Rect {
        Rect::new(self.x, self.y + self.height / 2.0, self.width, self.height / 2.0)
    }

    pub fn left_half(&self) -> Rect {
        Rect::new(self.x, self.y, self.width / 2.0, self.height)
    }

    pub fn right_half(&self) -> Rect {
        Rect::new(self.x + self.width / 2.0, self.y, self.width / 2.0, self.height)
    }
}
