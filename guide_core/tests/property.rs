use guide_core::{LinearRegressionGuide, MeasurementPoint};
use guide_traits::{ManualClock, MemoryStore};
use proptest::prelude::*;

// A guide cycle: either a measurement or a dropped frame.
fn cycle() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        4 => (-10.0f64..10.0).prop_map(Some),
        1 => Just(None),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn history_is_bounded_and_newest_first(ms in prop::collection::vec(-10.0f64..10.0, 0..450)) {
        let clk = ManualClock::new();
        let mut g = LinearRegressionGuide::new(MemoryStore::new(), "/p", clk.clone());
        let _ = g.configure(0.7, 0);
        for &m in &ms {
            g.step(m, 1000);
            clk.advance_ms(1000);
        }
        let h = g.history();
        prop_assert_eq!(h.len(), ms.len().min(200));
        let kept: Vec<f64> = h.iter().map(|p| p.measurement).collect();
        let want: Vec<f64> = ms.iter().rev().take(200).copied().collect();
        prop_assert_eq!(kept, want);
    }

    #[test]
    fn every_point_follows_the_recurrence(
        cycles in prop::collection::vec(cycle(), 1..300),
        gain in 0.0f64..=1.0,
        min_points in 0i64..40,
    ) {
        let clk = ManualClock::new();
        let mut g = LinearRegressionGuide::new(MemoryStore::new(), "/p", clk.clone());
        let _ = g.configure(gain, min_points);
        for c in &cycles {
            clk.advance_ms(1500);
            match *c {
                Some(m) => { g.step(m, 1500); }
                None => { g.predict_only(1500); }
            }
        }
        let points: Vec<MeasurementPoint> = g.history().iter_chronological().copied().collect();
        for pair in points.windows(2) {
            let want = MeasurementPoint::reconstruct(pair[1].measurement, Some(&pair[0]));
            prop_assert_eq!(pair[1].modified_measurement, want);
            prop_assert!(pair[1].timestamp >= pair[0].timestamp);
        }
        if let Some(first) = points.first().filter(|_| cycles.iter().flatten().count() <= 200) {
            // the very first point of a session is its own reconstruction
            prop_assert_eq!(first.modified_measurement, first.measurement);
        }
    }

    #[test]
    fn below_threshold_control_is_proportional(
        ms in prop::collection::vec(-10.0f64..10.0, 1..60),
        gain in 0.0f64..=1.0,
    ) {
        let clk = ManualClock::new();
        let mut g = LinearRegressionGuide::new(MemoryStore::new(), "/p", clk.clone());
        let _ = g.configure(gain, 60);
        for &m in &ms {
            prop_assert_eq!(g.step(m, 1000), gain * m);
            clk.advance_ms(1000);
        }
    }

    #[test]
    fn controls_are_finite(ms in prop::collection::vec(-1e3f64..1e3, 1..250)) {
        let clk = ManualClock::new();
        let mut g = LinearRegressionGuide::new(MemoryStore::new(), "/p", clk.clone());
        let _ = g.configure(1.0, 2);
        for &m in &ms {
            prop_assert!(g.step(m, 2000).is_finite());
            clk.advance_ms(2000);
        }
        prop_assert!(g.predict_only(2000).is_finite());
    }
}
