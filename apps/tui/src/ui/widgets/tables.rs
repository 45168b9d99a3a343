use std::ops::Range;

/// Rows of a `total`-row list to draw in `visible` lines so `selected` stays on screen.
pub fn visible_window(total: usize, visible: usize, selected: usize) -> Range<usize> {
    if total <= visible {
        return 0..total;
    }
    let start = (selected + 1).saturating_sub(visible).min(total - visible);
    start..start + visible
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_are_shown_whole() {
        assert_eq!(visible_window(3, 10, 2), 0..3);
    }

    #[test]
    fn window_follows_the_selection() {
        assert_eq!(visible_window(20, 5, 0), 0..5);
        assert_eq!(visible_window(20, 5, 4), 0..5);
        assert_eq!(visible_window(20, 5, 5), 1..6);
        assert_eq!(visible_window(20, 5, 19), 15..20);
    }

    #[test]
    fn zero_height_shows_nothing() {
        assert!(visible_window(20, 0, 3).is_empty());
    }
}
