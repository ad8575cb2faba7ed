/// A LIMIT/OFFSET window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl Default for LimitOffset {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl LimitOffset {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.max(0),
            offset: offset.max(0),
        }
    }
}
