use crate::models::{Category, Stat, StatSheet};

pub const XP_PER_LEVEL: u32 = 100;

/// Adds `amount` to the stat and levels up at most once.
///
/// An addition that carries xp to 200 or more still levels up a single time
/// and leaves the remainder above `XP_PER_LEVEL`. Returns true on level-up.
pub fn apply_xp(stat: &mut Stat, amount: u32) -> bool {
    stat.xp = stat.xp.saturating_add(amount);
    if stat.xp >= XP_PER_LEVEL {
        stat.level = stat.level.saturating_add(1);
        stat.xp -= XP_PER_LEVEL;
        return true;
    }
    false
}

impl StatSheet {
    pub fn apply_xp(&mut self, category: Category, amount: u32) -> bool {
        apply_xp(self.get_mut(category), amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xp_below_threshold_keeps_level() {
        let mut stat = Stat::default();
        assert!(!apply_xp(&mut stat, 99));
        assert_eq!(stat, Stat { level: 1, xp: 99 });
    }

    #[test]
    fn crossing_threshold_levels_up_once() {
        for start in [0u32, 1, 37, 50, 99] {
            for amount in [0u32, 1, 49, 50, 63, 99] {
                let mut stat = Stat { level: 3, xp: start };
                apply_xp(&mut stat, amount);
                let total = start + amount;
                assert_eq!(stat.level, 3 + total / XP_PER_LEVEL, "start={start} amount={amount}");
                assert_eq!(stat.xp, total % XP_PER_LEVEL, "start={start} amount={amount}");
            }
        }
    }

    #[test]
    fn exact_hundred_resets_to_zero() {
        let mut stat = Stat { level: 1, xp: 60 };
        assert!(apply_xp(&mut stat, 40));
        assert_eq!(stat, Stat { level: 2, xp: 0 });
    }

    #[test]
    fn large_addition_levels_up_only_once() {
        let mut stat = Stat { level: 1, xp: 50 };
        assert!(apply_xp(&mut stat, 250));
        assert_eq!(stat, Stat { level: 2, xp: 200 });

        // the leftover is only folded in by the next addition
        assert!(apply_xp(&mut stat, 0));
        assert_eq!(stat, Stat { level: 3, xp: 100 });
    }

    #[test]
    fn sheet_routes_to_matching_category() {
        let mut sheet = StatSheet::default();
        sheet.apply_xp(Category::Charisma, 120);
        assert_eq!(sheet.charisma, Stat { level: 2, xp: 20 });
        assert_eq!(sheet.strength, Stat::default());
        assert_eq!(sheet.intelligence, Stat::default());
        assert_eq!(sheet.wisdom, Stat::default());
    }
}
