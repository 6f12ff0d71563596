use serde::Serialize;

/// Position within a play session, 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayProgress {
    pub current: usize,
    pub total: usize,
}

impl PlayProgress {
    /// Progress for the question at zero-based `position`.
    #[must_use]
    pub fn at(position: usize, total: usize) -> Self {
        Self {
            current: (position + 1).min(total),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_one_based_and_capped() {
        assert_eq!(PlayProgress::at(0, 3), PlayProgress { current: 1, total: 3 });
        assert_eq!(PlayProgress::at(2, 3), PlayProgress { current: 3, total: 3 });
        assert_eq!(PlayProgress::at(3, 3), PlayProgress { current: 3, total: 3 });
    }
}
