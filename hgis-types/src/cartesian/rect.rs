use nalgebra::{Point2, Scalar};
use num_traits::{FromPrimitive, Num};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle.
///
/// Used both for map extents (in units of some coordinate reference system) and for device areas.
/// A rectangle with zero or negative width or height is considered *empty*.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    /// Minimum x coordinate.
    pub x_min: N,
    /// Minimum y coordinate.
    pub y_min: N,
    /// Maximum x coordinate.
    pub x_max: N,
    /// Maximum y coordinate.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd + Scalar + FromPrimitive> Rect<N> {
    /// Creates a new rectangle from its bounds.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Creates a rectangle from its top-left corner (minimum x and y) and size.
    pub fn from_origin_size(x: N, y: N, width: N, height: N) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Creates a rectangle with the given center and size.
    pub fn from_center_size(center: Point2<N>, width: N, height: N) -> Self {
        let two = N::one() + N::one();
        let half_width = width / two;
        let half_height = height / two;
        Self::new(
            center.x - half_width,
            center.y - half_height,
            center.x + half_width,
            center.y + half_height,
        )
    }

    /// Minimum x coordinate.
    pub fn x_min(&self) -> N {
        self.x_min
    }

    /// Maximum x coordinate.
    pub fn x_max(&self) -> N {
        self.x_max
    }

    /// Minimum y coordinate.
    pub fn y_min(&self) -> N {
        self.y_min
    }

    /// Maximum y coordinate.
    pub fn y_max(&self) -> N {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Returns true if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > N::zero() && self.height() > N::zero())
    }

    /// Returns the smallest rectangle that contains both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: if self.x_min < other.x_min {
                self.x_min
            } else {
                other.x_min
            },
            y_min: if self.y_min < other.y_min {
                self.y_min
            } else {
                other.y_min
            },
            x_max: if self.x_max > other.x_max {
                self.x_max
            } else {
                other.x_max
            },
            y_max: if self.y_max > other.y_max {
                self.y_max
            } else {
                other.y_max
            },
        }
    }

    /// Returns the bounding rectangle of the given points, or `None` if the iterator is empty.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2<N>>) -> Option<Self>
    where
        N: 'a,
    {
        let first = points.next()?;
        let mut x_min = first.x;
        let mut y_min = first.y;
        let mut x_max = first.x;
        let mut y_max = first.y;

        for p in points {
            if x_min > p.x {
                x_min = p.x;
            }
            if y_min > p.y {
                y_min = p.y;
            }
            if x_max < p.x {
                x_max = p.x;
            }
            if y_max < p.y {
                y_max = p.y;
            }
        }

        Some(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Returns true if the point lies inside the rectangle or on its border.
    pub fn contains(&self, point: &Point2<N>) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Returns true if `other` lies completely inside `self`.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    /// Returns true if the two rectangles share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.x_min <= other.x_max
            && self.x_max >= other.x_min
            && self.y_min <= other.y_max
            && self.y_max >= other.y_min
    }

    /// Scales the rectangle around its center.
    pub fn magnify(&self, factor: N) -> Self {
        let two = N::one() + N::one();
        let cx = (self.x_min + self.x_max) / two;
        let cy = (self.y_min + self.y_max) / two;
        let half_width = self.width() / two * factor;
        let half_height = self.height() / two * factor;
        Self {
            x_min: cx - half_width,
            x_max: cx + half_width,
            y_min: cy - half_height,
            y_max: cy + half_height,
        }
    }

    /// Grows every side of the rectangle by the given fraction of its width (for left and right
    /// sides) or height (for top and bottom).
    pub fn expand_by_fraction(&self, fraction: N) -> Self {
        let dx = self.width() * fraction;
        let dy = self.height() * fraction;
        Self {
            x_min: self.x_min - dx,
            x_max: self.x_max + dx,
            y_min: self.y_min - dy,
            y_max: self.y_max + dy,
        }
    }

    /// Returns the intersection of two rectangles. The result is empty if they do not intersect.
    pub fn limit(&self, other: Self) -> Self {
        Self {
            x_min: if self.x_min > other.x_min {
                self.x_min
            } else {
                other.x_min
            },
            y_min: if self.y_min > other.y_min {
                self.y_min
            } else {
                other.y_min
            },
            x_max: if self.x_max < other.x_max {
                self.x_max
            } else {
                other.x_max
            },
            y_max: if self.y_max < other.y_max {
                self.y_max
            } else {
                other.y_max
            },
        }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point2<N> {
        let two = N::one() + N::one();
        Point2::new(
            (self.x_min + self.x_max) / two,
            (self.y_min + self.y_max) / two,
        )
    }

    /// Corner points of the rectangle, counter-clockwise starting at the minimum corner.
    pub fn into_quadrangle(self) -> [Point2<N>; 4] {
        [
            Point2::new(self.x_min, self.y_min),
            Point2::new(self.x_max, self.y_min),
            Point2::new(self.x_max, self.y_max),
            Point2::new(self.x_min, self.y_max),
        ]
    }

    /// Corner points, edge midpoints and center of the rectangle.
    ///
    /// These are the points sampled when a rectangle is carried through a non-linear transformation.
    pub fn sample_points(&self) -> [Point2<N>; 9] {
        let c = self.center();
        [
            Point2::new(self.x_min, self.y_min),
            Point2::new(c.x, self.y_min),
            Point2::new(self.x_max, self.y_min),
            Point2::new(self.x_max, c.y),
            Point2::new(self.x_max, self.y_max),
            Point2::new(c.x, self.y_max),
            Point2::new(self.x_min, self.y_max),
            Point2::new(self.x_min, c.y),
            c,
        ]
    }
}

impl Rect<f64> {
    /// Returns true if all bounds are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x_min.is_finite()
            && self.y_min.is_finite()
            && self.x_max.is_finite()
            && self.y_max.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 20.0, 5.0);
        assert_eq!(a.merge(b), Rect::new(0.0, -5.0, 20.0, 10.0));
    }

    #[test]
    fn empty_rects() {
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
        assert!(Rect::new(0.0, 0.0, 10.0, -1.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn expand_by_fraction() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0).expand_by_fraction(0.1);
        assert_eq!(rect, Rect::new(-10.0, -5.0, 110.0, 55.0));
    }

    #[test]
    fn from_points() {
        let points = [
            Point2::new(1.0, 5.0),
            Point2::new(-3.0, 2.0),
            Point2::new(4.0, -1.0),
        ];
        let rect = Rect::from_points(points.iter()).unwrap();
        assert_eq!(rect, Rect::new(-3.0, -1.0, 4.0, 5.0));
        assert!(Rect::<f64>::from_points([].iter()).is_none());
    }

    #[test]
    fn intersects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!a.intersects(&Rect::new(10.1, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn sample_points_include_center() {
        let rect = Rect::new(0.0, 0.0, 2.0, 4.0);
        let points = rect.sample_points();
        assert_eq!(points.len(), 9);
        assert!(points.contains(&Point2::new(1.0, 2.0)));
        assert!(points.iter().all(|p| rect.contains(p)));
    }
}
