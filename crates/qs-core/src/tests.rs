//! Unit tests for qs-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EntityId, RequestId, ResourceId};

    #[test]
    fn index_roundtrip() {
        let id = EntityId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(EntityId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(EntityId(0) < EntityId(1));
        assert!(RequestId(100) > RequestId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(EntityId::INVALID.0, u32::MAX);
        assert_eq!(ResourceId::INVALID.0, u32::MAX);
        assert_eq!(RequestId::INVALID.0, u64::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(ResourceId(7).to_string(), "ResourceId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::{QsError, SampleFrequency, SimClock, SimTime};

    #[test]
    fn sim_time_arithmetic() {
        let t = SimTime(10.0);
        assert_eq!(t + 5.0, SimTime(15.0));
        assert_eq!(t.offset(2.5), SimTime(12.5));
        assert_eq!(SimTime(15.0) - SimTime(10.0), 5.0);
        assert_eq!(SimTime(15.0).since(SimTime(4.0)), 11.0);
    }

    #[test]
    fn sim_time_total_order() {
        let mut v = vec![SimTime(3.0), SimTime(0.5), SimTime(2.0)];
        v.sort();
        assert_eq!(v, vec![SimTime(0.5), SimTime(2.0), SimTime(3.0)]);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = SimClock::new();
        assert_eq!(clock.now(), SimTime::ZERO);
        clock.advance_to(SimTime(4.0)).unwrap();
        clock.advance_to(SimTime(4.0)).unwrap();
        assert_eq!(clock.now(), SimTime(4.0));
        let err = clock.advance_to(SimTime(1.0)).unwrap_err();
        assert!(matches!(err, QsError::InvalidState(_)));
        assert_eq!(clock.now(), SimTime(4.0));
    }

    #[test]
    fn sample_frequency_accepts_only_three_steps() {
        assert_eq!(SampleFrequency::try_from(0.01).unwrap(), SampleFrequency::Hundredth);
        assert_eq!(SampleFrequency::try_from(0.1).unwrap(), SampleFrequency::Tenth);
        assert_eq!(SampleFrequency::try_from(1.0).unwrap(), SampleFrequency::One);
        for bad in [0.5, 2.0, 0.0, 0.001, -1.0] {
            let err = SampleFrequency::try_from(bad).unwrap_err();
            assert!(matches!(err, QsError::UnsupportedSampleFrequency(f) if f == bad));
        }
    }

    #[test]
    fn decimals_match_step() {
        assert_eq!(SampleFrequency::Hundredth.decimals(), 2);
        assert_eq!(SampleFrequency::Tenth.decimals(), 1);
        assert_eq!(SampleFrequency::One.decimals(), 0);
    }

    #[test]
    fn grid_index_rounds_half_to_even() {
        let f = SampleFrequency::One;
        assert_eq!(f.grid_index(SimTime(0.5)), 0);
        assert_eq!(f.grid_index(SimTime(1.5)), 2);
        assert_eq!(f.grid_index(SimTime(2.4)), 2);
        assert_eq!(SampleFrequency::Tenth.grid_index(SimTime(0.34)), 3);
        assert_eq!(SampleFrequency::Hundredth.grid_index(SimTime(1.234)), 123);
    }

    #[test]
    fn sample_count_is_floor_of_now_over_step() {
        assert_eq!(SampleFrequency::One.sample_count(SimTime(10.0)), 10);
        assert_eq!(SampleFrequency::One.sample_count(SimTime(10.7)), 10);
        assert_eq!(SampleFrequency::Tenth.sample_count(SimTime(0.3)), 3);
        assert_eq!(SampleFrequency::Hundredth.sample_count(SimTime(1.0)), 100);
        assert_eq!(SampleFrequency::One.sample_count(SimTime::ZERO), 0);
    }
}

#[cfg(test)]
mod attr {
    use crate::{AttrValue, Attributes, PRIORITY_KEY};

    #[test]
    fn filter_requires_every_key_equal() {
        let attrs = Attributes::new().with(PRIORITY_KEY, 0).with("type", "Customer");
        assert!(attrs.matches(&Attributes::new()));
        assert!(attrs.matches(&Attributes::new().with("priority", 0)));
        assert!(attrs.matches(&Attributes::new().with("priority", 0).with("type", "Customer")));
        assert!(!attrs.matches(&Attributes::new().with("priority", 1)));
        assert!(!attrs.matches(&Attributes::new().with("vip", true)));
    }

    #[test]
    fn int_and_float_are_distinct_values() {
        let attrs = Attributes::new().with("priority", 0);
        assert!(!attrs.matches(&Attributes::new().with("priority", 0.0)));
    }

    #[test]
    fn priority_reads_integers_only() {
        assert_eq!(Attributes::new().with("priority", 3).priority(), Some(3));
        assert_eq!(Attributes::new().with("priority", "high").priority(), None);
        assert_eq!(Attributes::new().priority(), None);
    }

    #[test]
    fn insert_overwrites() {
        let mut attrs = Attributes::new().with("age", 30);
        let prev = attrs.insert("age", 31);
        assert_eq!(prev, Some(AttrValue::Int(30)));
        assert_eq!(attrs.get("age").and_then(AttrValue::as_int), Some(31));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn display_is_stable() {
        let attrs: Attributes = [("b", AttrValue::Bool(true)), ("a", AttrValue::Int(1))]
            .into_iter()
            .collect();
        assert_eq!(attrs.to_string(), r#"{"a": 1, "b": true}"#);
    }
}

#[cfg(test)]
mod rng {
    use proptest::prelude::*;

    use crate::SimRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SimRng::new(7);
        let mut b = SimRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.random::<u64>(), b.random::<u64>());
        }
    }

    #[test]
    fn children_diverge() {
        let mut root = SimRng::new(1);
        let mut c1 = root.child(1);
        let mut c2 = root.child(2);
        assert_ne!(c1.random::<u64>(), c2.random::<u64>());
    }

    #[test]
    fn uniform_empty_range_returns_lo() {
        let mut rng = SimRng::new(0);
        assert_eq!(rng.uniform(3.0, 3.0), 3.0);
    }

    proptest! {
        #[test]
        fn exponential_is_non_negative(seed in any::<u64>(), mean in 0.0f64..100.0) {
            let mut rng = SimRng::new(seed);
            for _ in 0..32 {
                let d = rng.exponential(mean);
                prop_assert!(d.is_finite());
                prop_assert!(d >= 0.0);
            }
        }
    }
}
