/// A 2D tilemap grid on a horizontal cylinder: x wraps, y does not.
#[derive(Clone, Debug)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// Neighbor offsets (dx, dy) in claim order: W, E, N, S, NW, NE, SW, SE.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),  // W
    (1, 0),   // E
    (0, -1),  // N
    (0, 1),   // S
    (-1, -1), // NW
    (1, -1),  // NE
    (-1, 1),  // SW
    (1, 1),   // SE
];

impl<T> Tilemap<T> {
    /// Build a tilemap by calling `f(x, y)` for every cell in row-major order.
    /// `width * height` must not overflow.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Row-major index. Coordinates must be in bounds.
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    /// Resolve possibly out-of-range coordinates on the cylinder.
    /// X wraps modulo width (negative values included), y outside
    /// `[0, height)` has no cell.
    pub fn wrap(&self, x: isize, y: isize) -> Option<(usize, usize)> {
        if y < 0 || y >= self.height as isize || self.width == 0 {
            return None;
        }
        let x = x.rem_euclid(self.width as isize) as usize;
        Some((x, y as usize))
    }

    /// Cell at wrapped coordinates, `None` past the top or bottom edge.
    pub fn get_wrapped(&self, x: isize, y: isize) -> Option<&T> {
        self.wrap(x, y).map(|(x, y)| self.get(x, y))
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_is_row_major() {
        let map = Tilemap::from_fn(3, 2, |x, y| (x, y));
        assert_eq!(map.len(), 6);
        assert_eq!(*map.get(2, 0), (2, 0));
        assert_eq!(*map.get(0, 1), (0, 1));

        let order: Vec<_> = map.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(order[3], (0, 1));
    }

    #[test]
    fn test_wrap_horizontal_only() {
        let map = Tilemap::from_fn(10, 5, |_, _| 0u8);

        assert_eq!(map.wrap(-1, 2), Some((9, 2)));
        assert_eq!(map.wrap(10, 2), Some((0, 2)));
        assert_eq!(map.wrap(-21, 0), Some((9, 0)));
        assert_eq!(map.wrap(3, -1), None);
        assert_eq!(map.wrap(3, 5), None);
    }

    #[test]
    fn test_get_mut_and_wrapped_lookup() {
        let mut map = Tilemap::from_fn(2, 2, |_, _| 0u32);
        *map.get_mut(1, 1) = 8;
        assert_eq!(*map.get_wrapped(-1, 1).unwrap(), 8);
        assert_eq!(*map.get_wrapped(3, 1).unwrap(), 8);
        assert!(map.get_wrapped(0, 2).is_none());
    }
}
