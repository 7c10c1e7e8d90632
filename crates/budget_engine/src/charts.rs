//! Visual projections of the slice list. All of them read `Slice::percent`, so they
//! agree with the legend.

use models::{BarSegment, ChartPalette, Donut, PieChart, Ring, Slice, SliceKind, Tone};

pub const MAX_RINGS: usize = 6;
const OUTER_RADIUS: f64 = 90.0;
const RING_STEP: f64 = 12.0;

fn neutral_gradient(palette: &ChartPalette) -> String {
    format!("conic-gradient({} 0deg 360deg)", palette.neutral)
}

pub fn pie(slices: &[Slice], palette: &ChartPalette) -> PieChart {
    if slices.is_empty() {
        return PieChart {
            gradient: neutral_gradient(palette),
            empty: true,
        };
    }
    let stops: Vec<String> = slices
        .iter()
        .map(|s| format!("{} {:.2}deg {:.2}deg", s.color, s.start_deg, s.end_deg))
        .collect();
    PieChart {
        gradient: format!("conic-gradient({})", stops.join(", ")),
        empty: false,
    }
}

/// Concentric rings, outermost first, for the first [`MAX_RINGS`] slices.
pub fn rings(slices: &[Slice]) -> Vec<Ring> {
    slices
        .iter()
        .take(MAX_RINGS)
        .enumerate()
        .map(|(i, s)| {
            let radius = OUTER_RADIUS - RING_STEP * i as f64;
            let circumference = 2.0 * std::f64::consts::PI * radius;
            let dash = circumference * f64::from(s.percent) / 100.0;
            Ring {
                label: s.label.clone(),
                color: s.color.clone(),
                radius,
                circumference,
                dash,
                gap: circumference - dash,
                percent: s.percent,
            }
        })
        .collect()
}

/// One small donut per revenue slice, filled to that slice's share.
pub fn donuts(slices: &[Slice], palette: &ChartPalette) -> Vec<Donut> {
    slices
        .iter()
        .filter(|s| matches!(s.kind, SliceKind::Person | SliceKind::Revenue))
        .map(|s| {
            let fill = f64::from(s.percent) * 3.6;
            Donut {
                label: s.label.clone(),
                percent: s.percent,
                gradient: format!(
                    "conic-gradient({} 0deg {:.2}deg, {} {:.2}deg 360deg)",
                    s.color, fill, palette.neutral, fill
                ),
            }
        })
        .collect()
}

pub fn stacked_bars(slices: &[Slice]) -> models::StackedBars {
    let row = |tone: Tone| -> Vec<BarSegment> {
        slices
            .iter()
            .filter(|s| s.tone == tone)
            .map(|s| BarSegment {
                label: s.label.clone(),
                color: s.color.clone(),
                width_pct: s.percent,
            })
            .collect()
    };
    models::StackedBars {
        positive: row(Tone::Positive),
        negative: row(Tone::Negative),
    }
}
