//! Slices of the bilan: each category's share of the grand total, with the angular
//! span it occupies on the pie.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Local;
use models::{BilanReport, CategoryTotals, ChartPalette, Slice, SliceKind, Tone};

use crate::charts;
use crate::registry::SharedRegistry;

/// `round(100 * value / total)`, or 0 when there is nothing to divide by.
pub fn percent_of(value: f64, total: f64) -> u32 {
    if total > 0.0 && value.is_finite() {
        (100.0 * value / total).round().max(0.0) as u32
    } else {
        0
    }
}

/// Slices in construction order: persons (or one revenue slice), apartments, fixed
/// expenses, variable expenses. Empty slices are dropped.
pub fn build_slices(totals: &CategoryTotals, palette: &ChartPalette) -> Vec<Slice> {
    let mut raw: Vec<(String, SliceKind, Tone, f64, String)> = Vec::new();

    if totals.revenue_by_person.is_empty() {
        raw.push((
            "Revenue".to_string(),
            SliceKind::Revenue,
            Tone::Positive,
            totals.revenue,
            palette.positive.clone(),
        ));
    } else {
        for (i, person) in totals.revenue_by_person.iter().enumerate() {
            raw.push((
                person.name.clone(),
                SliceKind::Person,
                Tone::Positive,
                person.amount,
                palette.series_color(i).to_string(),
            ));
        }
    }

    let (apartment_tone, apartment_color) = if totals.apartments >= 0.0 {
        (Tone::Positive, palette.positive.clone())
    } else {
        (Tone::Negative, palette.negative.clone())
    };
    raw.push((
        "Apartments".to_string(),
        SliceKind::Apartments,
        apartment_tone,
        totals.apartments.abs(),
        apartment_color,
    ));
    raw.push((
        "Fixed expenses".to_string(),
        SliceKind::FixedExpenses,
        Tone::Negative,
        totals.fixed_expenses,
        palette.fixed.clone(),
    ));
    raw.push((
        "Variable expenses".to_string(),
        SliceKind::VariableExpenses,
        Tone::Negative,
        totals.variable_expenses,
        palette.variable.clone(),
    ));

    raw.retain(|(_, _, _, value, _)| value.is_finite() && *value > 0.0);
    // shares are scale-free; dividing by the largest value keeps their sum finite
    let scale = raw.iter().map(|(_, _, _, v, _)| *v).fold(0.0, f64::max);
    let shares: Vec<f64> = raw.iter().map(|(_, _, _, v, _)| v / scale).collect();
    let total: f64 = shares.iter().sum();
    let percents = slice_percents(&shares, total);
    let count = raw.len();

    let mut cumulative = 0.0;
    raw.into_iter()
        .zip(shares.into_iter().zip(percents))
        .enumerate()
        .map(|(i, ((label, kind, tone, value, color), (share, percent)))| {
            let start_deg = cumulative / total * 360.0;
            cumulative += share;
            // last slice closes the circle exactly
            let end_deg = if i + 1 == count {
                360.0
            } else {
                cumulative / total * 360.0
            };
            Slice {
                label,
                kind,
                tone,
                value,
                percent,
                start_deg,
                end_deg,
                color,
            }
        })
        .collect()
}

/// [`percent_of`] for every share. Independent rounding may leave the sum one point
/// off 100; when it drifts further, the gap is handed out by largest remainder
/// (ties in slice order) so the sum comes back to exactly 100.
fn slice_percents(shares: &[f64], total: f64) -> Vec<u32> {
    let mut percents: Vec<u32> = shares.iter().map(|s| percent_of(*s, total)).collect();
    if total <= 0.0 {
        return percents;
    }
    let sum: i64 = percents.iter().map(|p| i64::from(*p)).sum();
    let gap = 100 - sum;
    if gap.abs() <= 1 {
        return percents;
    }

    // positive when the slice was rounded down
    let remainders: Vec<f64> = shares
        .iter()
        .zip(&percents)
        .map(|(s, p)| 100.0 * s / total - f64::from(*p))
        .collect();
    let mut order: Vec<usize> = (0..percents.len()).collect();
    let mut left = gap.unsigned_abs();
    if gap > 0 {
        order.sort_by(|&a, &b| remainders[b].total_cmp(&remainders[a]));
        for &i in order.iter().cycle().take(left as usize) {
            percents[i] += 1;
        }
    } else {
        order.sort_by(|&a, &b| remainders[a].total_cmp(&remainders[b]));
        for &i in &order {
            if left == 0 {
                break;
            }
            if percents[i] > 0 {
                percents[i] -= 1;
                left -= 1;
            }
        }
    }
    percents
}

pub fn slices_total(slices: &[Slice]) -> f64 {
    slices.iter().map(|s| s.value).sum()
}

/// Full bilan for one totals snapshot.
pub fn render(totals: &CategoryTotals, palette: &ChartPalette) -> BilanReport {
    let slices = build_slices(totals, palette);
    BilanReport {
        generated_at: Local::now().to_rfc3339(),
        totals: totals.clone(),
        net_balance: totals.net_balance(),
        total: slices_total(&slices),
        pie: charts::pie(&slices, palette),
        rings: charts::rings(&slices),
        donuts: charts::donuts(&slices, palette),
        bars: charts::stacked_bars(&slices),
        slices,
    }
}

struct ViewState {
    report: BilanReport,
    redraws: u64,
}

/// Bilan kept in sync with a registry: it re-renders only when the registry reports a
/// real change.
pub struct BilanView {
    state: Rc<RefCell<ViewState>>,
}

impl BilanView {
    pub fn attach(registry: &SharedRegistry, palette: ChartPalette) -> Self {
        let initial = render(&registry.borrow().snapshot(), &palette);
        let state = Rc::new(RefCell::new(ViewState {
            report: initial,
            redraws: 0,
        }));

        let sink = Rc::clone(&state);
        registry.borrow_mut().subscribe(move |totals| {
            let mut view = sink.borrow_mut();
            view.report = render(totals, &palette);
            view.redraws += 1;
        });

        Self { state }
    }

    pub fn report(&self) -> BilanReport {
        self.state.borrow().report.clone()
    }

    pub fn redraws(&self) -> u64 {
        self.state.borrow().redraws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::Budget;
    use models::PersonRevenue;

    fn totals() -> CategoryTotals {
        CategoryTotals {
            revenue: 3000.0,
            fixed_expenses: 1000.0,
            variable_expenses: 500.0,
            apartments: -500.0,
            revenue_by_person: vec![
                PersonRevenue {
                    name: "Alice".into(),
                    amount: 2000.0,
                },
                PersonRevenue {
                    name: "Bob".into(),
                    amount: 1000.0,
                },
            ],
        }
    }

    #[test]
    fn test_slices_follow_construction_order() {
        let slices = build_slices(&totals(), &ChartPalette::default());
        let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Alice", "Bob", "Apartments", "Fixed expenses", "Variable expenses"]
        );
        assert_eq!(slices[2].tone, Tone::Negative);
        assert_eq!(slices[2].value, 500.0);
    }

    #[test]
    fn test_percentages_and_angles() {
        let slices = build_slices(&totals(), &ChartPalette::default());
        let percents: Vec<u32> = slices.iter().map(|s| s.percent).collect();
        // total is 5000
        assert_eq!(percents, vec![40, 20, 10, 20, 10]);
        assert_eq!(percents.iter().sum::<u32>(), 100);

        assert_eq!(slices[0].start_deg, 0.0);
        assert_eq!(slices[0].end_deg, 144.0);
        for pair in slices.windows(2) {
            assert_eq!(pair[0].end_deg, pair[1].start_deg);
        }
        assert_eq!(slices.last().unwrap().end_deg, 360.0);
    }

    #[test]
    fn test_percentages_sum_to_about_100_with_rounding() {
        let mut t = totals();
        t.revenue_by_person = vec![PersonRevenue {
            name: "Solo".into(),
            amount: 1000.0,
        }];
        t.apartments = 1000.0;
        t.fixed_expenses = 1000.0;
        t.variable_expenses = 0.0;
        let slices = build_slices(&t, &ChartPalette::default());
        let sum: u32 = slices.iter().map(|s| s.percent).sum();
        assert!((99..=101).contains(&sum), "sum was {}", sum);
        assert_eq!(slices[1].tone, Tone::Positive);
    }

    #[test]
    fn test_many_equal_slices_are_pulled_back_to_100() {
        // seven equal persons round to 14 each, 98 in total
        let t = CategoryTotals {
            revenue: 700.0,
            revenue_by_person: (0..7)
                .map(|i| PersonRevenue {
                    name: format!("P{}", i),
                    amount: 100.0,
                })
                .collect(),
            ..Default::default()
        };
        assert_eq!(percent_of(100.0, 700.0), 14);

        let slices = build_slices(&t, &ChartPalette::default());
        let percents: Vec<u32> = slices.iter().map(|s| s.percent).collect();
        assert_eq!(percents, vec![15, 15, 14, 14, 14, 14, 14]);
        assert_eq!(percents.iter().sum::<u32>(), 100);
        assert_eq!(slices.last().unwrap().end_deg, 360.0);
    }

    #[test]
    fn test_one_point_drift_keeps_plain_rounding() {
        let t = CategoryTotals {
            revenue: 300.0,
            revenue_by_person: (0..3)
                .map(|i| PersonRevenue {
                    name: format!("P{}", i),
                    amount: 100.0,
                })
                .collect(),
            ..Default::default()
        };
        let percents: Vec<u32> = build_slices(&t, &ChartPalette::default())
            .iter()
            .map(|s| s.percent)
            .collect();
        assert_eq!(percents, vec![33, 33, 33]);
    }

    #[test]
    fn test_huge_values_keep_finite_angles() {
        let mut t = totals();
        t.revenue_by_person = vec![PersonRevenue {
            name: "Solo".into(),
            amount: f64::MAX,
        }];
        t.fixed_expenses = f64::MAX;
        t.apartments = 0.0;
        t.variable_expenses = 0.0;
        let slices = build_slices(&t, &ChartPalette::default());
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].percent, 50);
        assert_eq!(slices[0].end_deg, 180.0);
        assert!(slices.iter().all(|s| s.start_deg.is_finite()));
    }

    #[test]
    fn test_synthetic_revenue_slice_without_breakdown() {
        let mut t = totals();
        t.revenue_by_person.clear();
        let slices = build_slices(&t, &ChartPalette::default());
        assert_eq!(slices[0].kind, SliceKind::Revenue);
        assert_eq!(slices[0].value, 3000.0);
    }

    #[test]
    fn test_zero_slices_are_excluded() {
        let mut t = totals();
        t.apartments = 0.0;
        t.revenue_by_person[1].amount = 0.0;
        let slices = build_slices(&t, &ChartPalette::default());
        assert!(slices.iter().all(|s| s.value > 0.0));
        assert!(!slices.iter().any(|s| s.kind == SliceKind::Apartments));
        assert_eq!(slices.len(), 3);
    }

    #[test]
    fn test_zero_total_renders_neutral_state() {
        let report = render(&CategoryTotals::default(), &ChartPalette::default());
        assert!(report.slices.is_empty());
        assert_eq!(report.total, 0.0);
        assert!(report.pie.empty);
        assert_eq!(percent_of(10.0, 0.0), 0);
        assert_eq!(percent_of(0.0, 0.0), 0);
    }

    #[test]
    fn test_view_redraws_only_on_real_changes() {
        let mut budget = Budget::new();
        let view = BilanView::attach(budget.registry(), ChartPalette::default());
        assert_eq!(view.redraws(), 0);

        let id = budget.fixed.add().unwrap();
        assert_eq!(view.redraws(), 0);

        budget.fixed.set_amount(id, 250.0);
        assert_eq!(view.redraws(), 1);
        assert_eq!(view.report().slices.len(), 1);
        assert_eq!(view.report().slices[0].percent, 100);

        budget.fixed.set_amount(id, 250.0);
        budget.fixed.rename(id, "Phone");
        assert_eq!(view.redraws(), 1);
    }
}
