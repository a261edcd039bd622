// Integer Bresenham line rasterization.
// Visual: turns two pointer samples into the unbroken run of pixels between
// them, so a fast mouse flick still draws a solid stroke instead of dots.

use std::iter::FusedIterator;

use crate::types::Point;

/// Lazy sequence of the pixels on the line from `p0` to `p1`, both included.
/// Pure function of its inputs: calling `line` again (or cloning the
/// iterator) replays the exact same points. `line(p1, p0)` covers the same
/// pixels in reverse order.
pub fn line(p0: Point, p1: Point) -> Line {
    // Widened so endpoints at opposite ends of i32 cannot overflow.
    let dx = (p1.x as i64 - p0.x as i64).abs();
    let dy = -(p1.y as i64 - p0.y as i64).abs();
    Line {
        cur: p0,
        end: p1,
        dx,
        dy,
        sx: if p0.x < p1.x { 1 } else { -1 },
        sy: if p0.y < p1.y { 1 } else { -1 },
        err: dx + dy,
        done: false,
    }
}

#[derive(Clone, Debug)]
pub struct Line {
    cur: Point,
    end: Point,
    dx: i64,  // |x1 - x0|
    dy: i64,  // -|y1 - y0|
    sx: i32,
    sy: i32,
    err: i64, // dx + dy, carried between steps
    done: bool,
}

impl Iterator for Line {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let out = self.cur;
        if self.cur == self.end {
            self.done = true;
            return Some(out);
        }

        // Exact half-way ties step on the way forward but not on the way
        // back, so both directions settle on the same pixel.
        let e2 = 2 * self.err;
        let step_x = if self.sx < 0 { e2 > self.dy } else { e2 >= self.dy };
        let step_y = if self.sy < 0 { e2 < self.dx } else { e2 <= self.dx };
        if step_x {
            self.err += self.dy;
            self.cur.x += self.sx;
        }
        if step_y {
            self.err += self.dx;
            self.cur.y += self.sy;
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // Every step moves the major axis by exactly one.
        let major = (self.end.x as i64 - self.cur.x as i64)
            .unsigned_abs()
            .max((self.end.y as i64 - self.cur.y as i64).unsigned_abs());
        let rest = usize::try_from(major + 1).unwrap_or(usize::MAX);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Line {}
impl FusedIterator for Line {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(i32, i32)]) -> Vec<Point> {
        v.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn check_connected(p0: Point, p1: Point) {
        let run: Vec<Point> = line(p0, p1).collect();
        assert_eq!(run.first(), Some(&p0));
        assert_eq!(run.last(), Some(&p1));
        for w in run.windows(2) {
            assert_ne!(w[0], w[1], "duplicate adjacent point in {p0:?}->{p1:?}");
            assert!((w[0].x - w[1].x).abs() <= 1 && (w[0].y - w[1].y).abs() <= 1);
        }
        // Endpoints exactly once.
        assert_eq!(run.iter().filter(|&&p| p == p0).count(), 1);
        assert_eq!(run.iter().filter(|&&p| p == p1).count(), 1);
    }

    fn sorted(mut run: Vec<Point>) -> Vec<Point> {
        run.sort_by_key(|p| (p.x, p.y));
        run
    }

    #[test]
    fn single_point_when_endpoints_match() {
        let p = Point::new(-4, 9);
        assert_eq!(line(p, p).collect::<Vec<_>>(), vec![p]);
    }

    #[test]
    fn horizontal_run() {
        let run: Vec<Point> = line(Point::new(10, 10), Point::new(13, 10)).collect();
        assert_eq!(run, pts(&[(10, 10), (11, 10), (12, 10), (13, 10)]));
    }

    #[test]
    fn vertical_and_diagonal_runs() {
        assert_eq!(
            line(Point::new(0, 3), Point::new(0, 0)).collect::<Vec<_>>(),
            pts(&[(0, 3), (0, 2), (0, 1), (0, 0)])
        );
        assert_eq!(
            line(Point::new(0, 0), Point::new(-3, 3)).collect::<Vec<_>>(),
            pts(&[(0, 0), (-1, 1), (-2, 2), (-3, 3)])
        );
    }

    #[test]
    fn shallow_slope_matches_classic_bresenham() {
        let run: Vec<Point> = line(Point::new(0, 0), Point::new(6, 2)).collect();
        assert_eq!(
            run,
            pts(&[(0, 0), (1, 0), (2, 1), (3, 1), (4, 1), (5, 2), (6, 2)])
        );
    }

    #[test]
    fn every_direction_is_8_connected() {
        let origin = Point::new(0, 0);
        for x in -7..=7 {
            for y in -7..=7 {
                check_connected(origin, Point::new(x, y));
                check_connected(Point::new(x, y), Point::new(3, -5));
            }
        }
    }

    #[test]
    fn reversed_line_covers_same_pixels() {
        let grid: Vec<Point> = (-6..=6)
            .flat_map(|x| (-6..=6).map(move |y| Point::new(x, y)))
            .collect();
        for &a in &grid {
            for &b in &grid {
                let fwd: Vec<Point> = line(a, b).collect();
                let back: Vec<Point> = line(b, a).collect();
                assert_eq!(sorted(fwd), sorted(back), "{a:?}->{b:?}");
            }
        }
    }

    #[test]
    fn reversed_half_way_tie() {
        let fwd: Vec<Point> = line(Point::new(2, 9), Point::new(-5, 1)).collect();
        assert_eq!(
            fwd,
            pts(&[(2, 9), (1, 8), (0, 7), (-1, 6), (-1, 5), (-2, 4), (-3, 3), (-4, 2), (-5, 1)])
        );
        let mut back: Vec<Point> = line(Point::new(-5, 1), Point::new(2, 9)).collect();
        back.reverse();
        assert_eq!(back, fwd);
    }

    #[test]
    fn restartable_and_exact_size() {
        let l = line(Point::new(-2, 5), Point::new(7, -1));
        assert_eq!(l.len(), 10);
        let first: Vec<Point> = l.clone().collect();
        let second: Vec<Point> = l.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
    }

    #[test]
    fn far_apart_endpoints_do_not_overflow() {
        let mut l = line(Point::new(i32::MIN, 0), Point::new(i32::MAX, 0));
        assert_eq!(l.next(), Some(Point::new(i32::MIN, 0)));
        assert_eq!(l.next(), Some(Point::new(i32::MIN + 1, 0)));

        let mut l = line(Point::new(0, 0), Point::new((1 << 30) + 1, 0));
        assert_eq!(l.next(), Some(Point::new(0, 0)));
        assert_eq!(l.next(), Some(Point::new(1, 0)));

        let mut l = line(Point::new(i32::MAX, i32::MAX), Point::new(i32::MIN, i32::MIN));
        assert_eq!(l.next(), Some(Point::new(i32::MAX, i32::MAX)));
        assert_eq!(l.next(), Some(Point::new(i32::MAX - 1, i32::MAX - 1)));

        let mut l = line(Point::new(i32::MIN, i32::MAX), Point::new(i32::MAX, i32::MIN + 7));
        l.next();
        l.next();
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn full_range_length_is_exact() {
        let l = line(Point::new(i32::MIN, 0), Point::new(i32::MAX, 3));
        assert_eq!(l.len(), 1usize << 32);
        let l = line(Point::new(i32::MAX - 1, i32::MIN), Point::new(i32::MAX, i32::MAX));
        assert_eq!(l.len(), 1usize << 32);
    }
}
