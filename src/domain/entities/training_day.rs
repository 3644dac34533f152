use chrono::Weekday;

/// Weekdays on which the academy runs sessions.
pub const TRAINING_WEEKDAYS: [Weekday; 4] = [Weekday::Mon, Weekday::Wed, Weekday::Fri, Weekday::Sat];

pub fn is_training_day(weekday: Weekday) -> bool {
    TRAINING_WEEKDAYS.contains(&weekday)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_days() {
        assert!(is_training_day(Weekday::Mon));
        assert!(is_training_day(Weekday::Wed));
        assert!(is_training_day(Weekday::Fri));
        assert!(is_training_day(Weekday::Sat));
    }

    #[test]
    fn test_rest_days() {
        assert!(!is_training_day(Weekday::Tue));
        assert!(!is_training_day(Weekday::Thu));
        assert!(!is_training_day(Weekday::Sun));
    }
}
