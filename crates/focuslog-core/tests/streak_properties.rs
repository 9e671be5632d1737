//! Property tests for the check-in streak calculator.

use chrono::{Duration, NaiveDate};
use focuslog_core::checkin::DATE_FORMAT;
use focuslog_core::{calculate_streak, DailyTotal, STREAK_WINDOW_DAYS};
use proptest::prelude::*;

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

fn run(start: NaiveDate, durations: &[u64]) -> Vec<DailyTotal> {
    durations
        .iter()
        .enumerate()
        .map(|(i, &secs)| {
            let date = start - Duration::days(i as i64);
            DailyTotal::new(date.format(DATE_FORMAT).to_string(), secs)
        })
        .collect()
}

proptest! {
    #[test]
    fn qualifying_run_from_today_counts_every_day(n in 0usize..400, goal in 0u64..20_000, extra in 0u64..5_000) {
        let today = base_day();
        let totals = run(today, &vec![goal + extra; n]);
        let expected = n.min(STREAK_WINDOW_DAYS) as u32;
        prop_assert_eq!(calculate_streak(today, &totals, goal), expected);
    }

    #[test]
    fn qualifying_run_from_yesterday_counts_every_day(n in 1usize..100, goal in 0u64..20_000) {
        let today = base_day();
        let totals = run(today - Duration::days(1), &vec![goal; n]);
        prop_assert_eq!(calculate_streak(today, &totals, goal), n as u32);
    }

    #[test]
    fn shortfall_caps_at_its_position(n in 2usize..60, k_seed in any::<usize>(), goal in 1u64..20_000) {
        let k = k_seed % n;
        let mut durations = vec![goal; n];
        durations[k] = goal - 1;
        let totals = run(base_day(), &durations);
        prop_assert_eq!(calculate_streak(base_day(), &totals, goal), k as u32);
    }

    #[test]
    fn gap_caps_at_its_position(n in 2usize..60, k_seed in any::<usize>(), goal in 0u64..20_000) {
        let k = 1 + k_seed % (n - 1);
        let today = base_day();
        let mut totals = run(today, &vec![goal; k]);
        totals.extend(run(today - Duration::days(k as i64 + 1), &vec![goal; n - k]));
        prop_assert_eq!(calculate_streak(today, &totals, goal), k as u32);
    }

    #[test]
    fn streak_never_exceeds_input(durations in proptest::collection::vec(0u64..10_000, 0..50), goal in 0u64..10_000) {
        let totals = run(base_day(), &durations);
        prop_assert!(calculate_streak(base_day(), &totals, goal) as usize <= totals.len());
    }
}
