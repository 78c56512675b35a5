/// Number of rows of a grid, the `x` axis of a `Position`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Depth(pub usize);

/// Number of columns of a grid, the `y` axis of a `Position`.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Width(pub usize);

#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub struct TilesCount(pub usize);
