use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Smallest rectangle covering both. An empty rectangle contributes nothing.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Share of the larger rectangle covered by the intersection, in `[0, 1]`.
    pub fn overlap_ratio(&self, other: &Rect) -> f64 {
        let larger = self.area().max(other.area());
        if larger <= 0.0 {
            return 0.0;
        }
        self.intersect(other).map_or(0.0, |r| r.area() / larger)
    }

    /// Vertical distance from the point to this rectangle, zero when inside the band.
    pub fn vertical_distance(&self, point: Point) -> f64 {
        if point.y < self.top() {
            self.top() - point.y
        } else if point.y > self.bottom() {
            point.y - self.bottom()
        } else {
            0.0
        }
    }
}

/// Affine transform `[m11 m12; m21 m22] + (dx, dy)` using row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m11: sx,
            m22: sy,
            ..Self::identity()
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Applies `self` first, then `outer`.
    pub fn then(&self, outer: &Transform) -> Transform {
        Transform {
            m11: self.m11 * outer.m11 + self.m12 * outer.m21,
            m12: self.m11 * outer.m12 + self.m12 * outer.m22,
            m21: self.m21 * outer.m11 + self.m22 * outer.m21,
            m22: self.m21 * outer.m12 + self.m22 * outer.m22,
            dx: self.dx * outer.m11 + self.dy * outer.m21 + outer.dx,
            dy: self.dx * outer.m12 + self.dy * outer.m22 + outer.dy,
        }
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.m11 + point.y * self.m21 + self.dx,
            point.x * self.m12 + point.y * self.m22 + self.dy,
        )
    }

    /// Bounding box of the transformed corners.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        if self.is_identity() {
            return *rect;
        }
        let corners = [
            self.apply(Point::new(rect.left(), rect.top())),
            self.apply(Point::new(rect.right(), rect.top())),
            self.apply(Point::new(rect.left(), rect.bottom())),
            self.apply(Point::new(rect.right(), rect.bottom())),
        ];
        let mut left = f64::INFINITY;
        let mut top = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for corner in corners {
            left = left.min(corner.x);
            top = top.min(corner.y);
            right = right.max(corner.x);
            bottom = bottom.max(corner.y);
        }
        Rect::new(left, top, right - left, bottom - top)
    }
}
