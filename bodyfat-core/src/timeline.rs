use bodyfat_model::advice::TimelineStep;
use bodyfat_model::profile::Gender;

use crate::round1;

const MAX_MILESTONES: usize = 6;

/// Deterministic staged reduction plan from `current` to `target` percent.
///
/// The monthly rate is picked once from the starting percentage and kept for
/// the whole run, even when the projection crosses into a lower band.
/// Milestones shrink by 1.5 points above 20% and 1.0 below; each one costs
/// at least a month. After six milestones the plan is cut short with a
/// single correction step that lands exactly on the target.
///
/// Gender is part of the request contract but does not influence the rate.
pub fn reduction_plan(current: f64, target: f64, _gender: Gender) -> Vec<TimelineStep> {
    let monthly_rate = if current > 25.0 {
        1.0
    } else if current > 20.0 {
        0.75
    } else {
        0.5
    };

    let mut steps: Vec<TimelineStep> = Vec::new();
    let mut percent = current;
    let mut total_months = 0;

    while percent > target {
        let step_size = if percent > 20.0 { 1.5 } else { 1.0 };
        let next = target.max(percent - step_size);

        total_months += months_at_rate(percent - next, monthly_rate);
        steps.push(TimelineStep {
            percent: round1(next),
            months: total_months,
        });
        percent = next;

        if steps.len() >= MAX_MILESTONES {
            break;
        }
    }

    if let Some(last) = steps.last().copied() {
        if last.percent > target {
            steps.push(TimelineStep {
                percent: round1(target),
                months: last.months + months_at_rate(last.percent - target, monthly_rate),
            });
        }
    }

    if steps.is_empty() {
        steps.push(TimelineStep {
            percent: round1(current),
            months: 0,
        });
    }

    steps
}

// Half-month ties round to the even count, so a 4.5-month stretch plans as
// 4 months.
fn months_at_rate(reduction: f64, monthly_rate: f64) -> u32 {
    (reduction / monthly_rate).round_ties_even().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_plan_from_thirty_to_ten() {
        let plan = reduction_plan(30.0, 10.0, Gender::Male);

        let expected = [
            (28.5, 2),
            (27.0, 4),
            (25.5, 6),
            (24.0, 8),
            (22.5, 10),
            (21.0, 12),
            (10.0, 23),
        ];
        assert_eq!(plan.len(), expected.len());
        for (step, (percent, months)) in plan.iter().zip(expected) {
            assert_eq!(step.percent, percent);
            assert_eq!(step.months, months);
        }
    }

    #[test]
    fn rate_is_fixed_from_the_starting_percentage() {
        // Starts in the (20, 25] band, so 0.75%/month applies to every
        // stage, including the ones below 20%.
        let plan = reduction_plan(22.0, 18.0, Gender::Female);

        assert_eq!(
            plan,
            vec![
                TimelineStep { percent: 20.5, months: 2 },
                TimelineStep { percent: 19.0, months: 4 },
                TimelineStep { percent: 18.0, months: 5 },
            ]
        );
    }

    #[test]
    fn already_at_target_yields_degenerate_plan() {
        let plan = reduction_plan(9.5, 10.0, Gender::Male);
        assert_eq!(plan, vec![TimelineStep { percent: 9.5, months: 0 }]);

        let plan = reduction_plan(10.0, 10.0, Gender::Female);
        assert_eq!(plan, vec![TimelineStep { percent: 10.0, months: 0 }]);
    }

    #[test]
    fn plans_are_monotonic_bounded_and_land_on_target() {
        let mut current = 10.2;
        while current < 45.0 {
            let plan = reduction_plan(current, 10.0, Gender::Male);

            assert!(!plan.is_empty());
            assert!(plan.len() <= MAX_MILESTONES + 1, "start {}", current);
            for window in plan.windows(2) {
                assert!(window[0].months <= window[1].months, "start {}", current);
                assert!(window[0].percent > window[1].percent, "start {}", current);
            }
            assert_eq!(plan.last().unwrap().percent, 10.0, "start {}", current);
            assert!(plan.last().unwrap().months >= 1, "start {}", current);

            current += 0.7;
        }
    }

    #[test]
    fn half_month_ties_round_to_even() {
        // Six 2-month milestones, then a 2.25% correction at 0.5%/month:
        // 4.5 months plans as 4, not 5.
        let plan = reduction_plan(18.25, 10.0, Gender::Male);

        assert_eq!(
            plan.last(),
            Some(&TimelineStep { percent: 10.0, months: 16 })
        );
    }

    #[test]
    fn short_distance_takes_at_least_one_month() {
        let plan = reduction_plan(10.2, 10.0, Gender::Male);
        assert_eq!(plan, vec![TimelineStep { percent: 10.0, months: 1 }]);
    }
}
