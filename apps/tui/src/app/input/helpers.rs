/// Neighbouring option index in a list of `len`, wrapping at both ends.
pub const fn cycle_index(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        return (index + 1) % len;
    }
    if index == 0 || index >= len {
        len - 1
    } else {
        index - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_in_both_directions() {
        assert_eq!(cycle_index(0, 3, true), 1);
        assert_eq!(cycle_index(2, 3, true), 0);
        assert_eq!(cycle_index(0, 3, false), 2);
        assert_eq!(cycle_index(2, 3, false), 1);
    }

    #[test]
    fn empty_and_stale_indices() {
        assert_eq!(cycle_index(4, 0, true), 0);
        assert_eq!(cycle_index(4, 0, false), 0);
        assert_eq!(cycle_index(9, 3, false), 2);
    }
}
