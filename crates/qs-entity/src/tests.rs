//! Unit tests for qs-entity.

use qs_core::{Attributes, QsError, SimTime};
use qs_resource::ServiceTime;

use crate::{Entity, Resource};

fn t(x: f64) -> SimTime {
    SimTime(x)
}

fn resource(name: &str, capacity: usize, service: f64) -> Resource {
    Resource::builder(name, capacity)
        .service_time(ServiceTime::constant(service))
        .build()
        .unwrap()
}

/// Run one uncontended visit: arrive at `arrive`, serve immediately, finish
/// after the service time.  Returns the finish instant.
fn serve(entity: &mut Entity, res: &mut Resource, arrive: f64) -> f64 {
    entity.wait_for_resource(t(arrive), res, None).unwrap();
    let d = entity.process_at_resource(t(arrive), res).unwrap();
    let done = arrive + d;
    entity.release_resource(t(done), res).unwrap();
    done
}

// ── Construction and attributes ───────────────────────────────────────────────

#[cfg(test)]
mod attributes {
    use super::*;
    use qs_core::AttrValue;

    #[test]
    fn default_priority_is_one() {
        let e = Entity::new("customer");
        assert_eq!(e.priority(), 1);
        assert_eq!(e.attributes().get("priority"), Some(&AttrValue::Int(1)));
    }

    #[test]
    fn supplied_priority_is_kept() {
        let e = Entity::with_attributes("vip", Attributes::new().with("priority", 0));
        assert_eq!(e.priority(), 0);
    }

    #[test]
    fn set_attribute_overwrites() {
        let mut e = Entity::new("customer");
        e.set_attribute("priority", 0);
        e.set_attribute("vip", true);
        assert_eq!(e.priority(), 0);
        assert!(e.matches_attributes(&Attributes::new().with("vip", true)));
        assert!(!e.matches_attributes(&Attributes::new().with("vip", false)));
        assert!(!e.matches_attributes(&Attributes::new().with("missing", 1)));
        assert!(e.matches_attributes(&Attributes::new()));
    }

    #[test]
    fn display_lists_name_creation_and_attributes() {
        let mut e = Entity::new("customer");
        e.set_name("customer 3");
        e.set_creation_time(t(2.5));
        assert_eq!(e.to_string(), r#"customer 3 created_at: 2.5 attributes: {"priority": 1}"#);
    }
}

// ── Visits ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod visits {
    use super::*;
    use crate::EntityState;

    #[test]
    fn single_visit_records_three_timestamps() {
        let mut res = resource("Teller", 1, 3.0);
        let mut e = Entity::new("customer");
        serve(&mut e, &mut res, 1.0);

        let v = e.visit("Teller").unwrap();
        assert_eq!(v.arrival_time, vec![t(1.0)]);
        assert_eq!(v.start_service_time, vec![t(1.0)]);
        assert_eq!(v.finish_service_time, vec![t(4.0)]);
        assert_eq!(v.held_request(), None);
        assert!(e.did_visit_resource("Teller"));
        assert!(!e.did_visit_resource("Desk"));
    }

    #[test]
    fn request_uses_override_then_stored_priority() {
        let mut res = resource("Teller", 1, 1.0);
        let mut a = Entity::new("a");
        let mut b = Entity::new("b");
        let mut c = Entity::new("c");
        let ra = a.wait_for_resource(t(0.0), &mut res, None).unwrap();
        let rb = b.wait_for_resource(t(0.0), &mut res, None).unwrap();
        let rc = c.wait_for_resource(t(0.0), &mut res, Some(0)).unwrap();
        assert!(res.is_granted(ra));
        assert_eq!(a.release_resource(t(1.0), &mut res).unwrap(), vec![rc]);
        assert!(!res.is_granted(rb));
    }

    #[test]
    fn processing_before_grant_is_invalid() {
        let mut res = resource("Teller", 1, 1.0);
        let mut a = Entity::new("a");
        let mut b = Entity::new("b");
        a.wait_for_resource(t(0.0), &mut res, None).unwrap();
        b.wait_for_resource(t(0.0), &mut res, None).unwrap();
        assert!(matches!(
            b.process_at_resource(t(0.0), &mut res),
            Err(QsError::InvalidState(_))
        ));
    }

    #[test]
    fn processing_unvisited_resource_is_invalid() {
        let mut res = resource("Teller", 1, 1.0);
        let mut e = Entity::new("a");
        assert!(matches!(e.process_at_resource(t(0.0), &mut res), Err(QsError::InvalidState(_))));
        assert!(matches!(e.release_resource(t(0.0), &mut res), Err(QsError::InvalidState(_))));
    }

    #[test]
    fn second_request_while_holding_is_invalid() {
        let mut res = resource("Teller", 2, 1.0);
        let mut e = Entity::new("a");
        e.wait_for_resource(t(0.0), &mut res, None).unwrap();
        assert!(matches!(
            e.wait_for_resource(t(0.0), &mut res, None),
            Err(QsError::InvalidState(_))
        ));
    }

    #[test]
    fn release_logs_start_and_release_events() {
        let mut res = resource("Teller", 1, 2.0);
        let mut e = Entity::new("a");
        serve(&mut e, &mut res, 0.0);
        let kinds: Vec<_> = res.events().iter().map(|ev| ev.kind.to_string()).collect();
        assert_eq!(kinds, vec!["request", "start", "release"]);
    }

    #[test]
    fn double_release_is_noop() {
        let mut res = resource("Teller", 1, 2.0);
        let mut e = Entity::new("a");
        serve(&mut e, &mut res, 0.0);
        let logged = res.events().len();

        assert!(e.release_resource(t(5.0), &mut res).unwrap().is_empty());
        assert_eq!(res.events().len(), logged);
        assert_eq!(e.visit("Teller").unwrap().finish_service_time, vec![t(2.0)]);
    }

    #[test]
    fn releasing_queued_request_withdraws_visit() {
        let mut res = resource("Teller", 1, 5.0);
        let mut holder = Entity::new("holder");
        holder.wait_for_resource(t(0.0), &mut res, None).unwrap();

        let mut e = Entity::new("a");
        e.wait_for_resource(t(0.0), &mut res, None).unwrap();
        assert!(e.release_resource(t(1.0), &mut res).unwrap().is_empty());

        let visit = e.visit("Teller").unwrap();
        assert!(visit.arrival_time.is_empty());
        assert!(visit.finish_service_time.is_empty());
        assert_eq!(visit.held_request(), None);
        assert_eq!(res.queue_len(), 0);
        assert!(e.did_visit_resource("Teller"));
    }

    #[test]
    fn dispose_is_terminal() {
        let mut e = Entity::new("a");
        assert_eq!(e.state(), EntityState::Active);
        e.dispose(t(3.0)).unwrap();
        assert_eq!(e.state(), EntityState::Disposed);
        assert!(matches!(e.dispose(t(4.0)), Err(QsError::InvalidState(_))));
        assert_eq!(e.disposal_time(), Some(t(3.0)));
    }

    #[test]
    fn no_visits_after_disposal() {
        let mut res = resource("Teller", 1, 2.0);
        let mut e = Entity::new("a");
        e.dispose(t(0.0)).unwrap();
        assert!(matches!(
            e.wait_for_resource(t(1.0), &mut res, None),
            Err(QsError::InvalidState(_))
        ));
    }

    #[test]
    fn per_entity_service_time_reads_attributes() {
        let mut res = Resource::builder("Desk", 1)
            .service_time(ServiceTime::per_entity(|e: &Entity| {
                if e.priority() == 0 { 1.0 } else { 4.0 }
            }))
            .build()
            .unwrap();
        let mut vip = Entity::with_attributes("vip", Attributes::new().with("priority", 0));
        let mut regular = Entity::new("regular");
        assert_eq!(serve(&mut vip, &mut res, 0.0), 1.0);
        assert_eq!(serve(&mut regular, &mut res, 1.0), 5.0);
    }

    #[test]
    fn failing_service_time_surfaces_model_callback() {
        let mut res = Resource::builder("Desk", 1)
            .service_time(ServiceTime::try_per_entity(|_: &Entity| Err("bad model".into())))
            .build()
            .unwrap();
        let mut e = Entity::new("a");
        e.wait_for_resource(t(0.0), &mut res, None).unwrap();
        assert!(matches!(
            e.process_at_resource(t(0.0), &mut res),
            Err(QsError::ModelCallback { .. })
        ));
    }
}

// ── Timing ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod timing {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn queries_require_disposal() {
        let e = Entity::new("a");
        assert!(matches!(e.total_time(), Err(QsError::InvalidState(_))));
        assert!(matches!(e.total_waiting_time(), Err(QsError::InvalidState(_))));
        assert!(matches!(e.processing_time_for("Teller"), Err(QsError::InvalidState(_))));
    }

    #[test]
    fn contended_visit_splits_wait_and_processing() {
        let mut res = resource("Teller", 1, 5.0);
        let mut first = Entity::new("a");
        let mut second = Entity::new("b");
        second.set_creation_time(t(1.0));

        first.wait_for_resource(t(0.0), &mut res, None).unwrap();
        first.process_at_resource(t(0.0), &mut res).unwrap();
        second.wait_for_resource(t(1.0), &mut res, None).unwrap();
        first.release_resource(t(5.0), &mut res).unwrap();
        first.dispose(t(5.0)).unwrap();
        second.process_at_resource(t(5.0), &mut res).unwrap();
        second.release_resource(t(10.0), &mut res).unwrap();
        second.dispose(t(10.0)).unwrap();

        assert_eq!(first.total_waiting_time().unwrap(), 0.0);
        assert_eq!(second.total_waiting_time().unwrap(), 4.0);
        assert_eq!(second.total_processing_time().unwrap(), 5.0);
        assert_eq!(second.total_time().unwrap(), 9.0);
        assert_eq!(second.waiting_time_for("Teller").unwrap(), Some(4.0));
        assert_eq!(second.waiting_time_for("Desk").unwrap(), None);
    }

    #[test]
    fn repeat_visits_accumulate() {
        let mut res = resource("Teller", 1, 2.0);
        let mut e = Entity::new("a");
        let done = serve(&mut e, &mut res, 0.0);
        serve(&mut e, &mut res, done + 3.0);
        e.dispose(t(10.0)).unwrap();

        assert_eq!(e.visit("Teller").unwrap().completed_visits(), 2);
        assert_eq!(e.total_processing_time().unwrap(), 4.0);
        assert_eq!(e.total_waiting_time().unwrap(), 0.0);
    }

    #[test]
    fn incomplete_visit_is_ignored() {
        let mut busy = resource("Teller", 1, 2.0);
        let mut holder = Entity::new("holder");
        holder.wait_for_resource(t(0.0), &mut busy, None).unwrap();

        let mut e = Entity::new("a");
        e.wait_for_resource(t(1.0), &mut busy, None).unwrap();
        e.dispose(t(6.0)).unwrap();
        assert_eq!(e.total_waiting_time().unwrap(), 0.0);
        assert_eq!(e.total_processing_time().unwrap(), 0.0);
        assert_eq!(e.total_time().unwrap(), 6.0);
    }

    #[test]
    fn withdrawn_request_does_not_skew_later_visit() {
        let mut res = resource("Teller", 1, 5.0);
        let mut occupant = Entity::new("occupant");
        occupant.wait_for_resource(t(0.0), &mut res, None).unwrap();
        occupant.process_at_resource(t(0.0), &mut res).unwrap();

        let mut e = Entity::new("a");
        e.wait_for_resource(t(0.0), &mut res, None).unwrap();
        e.release_resource(t(1.0), &mut res).unwrap();
        occupant.release_resource(t(5.0), &mut res).unwrap();

        let done = serve(&mut e, &mut res, 10.0);
        e.dispose(t(done)).unwrap();

        let visit = e.visit("Teller").unwrap();
        assert_eq!(visit.arrival_time, vec![t(10.0)]);
        assert_eq!(visit.start_service_time, vec![t(10.0)]);
        assert_eq!(visit.finish_service_time, vec![t(15.0)]);
        assert_eq!(e.waiting_time_for("Teller").unwrap(), Some(0.0));
        assert_eq!(e.processing_time_for("Teller").unwrap(), Some(5.0));
        assert_eq!(e.total_time().unwrap(), 15.0);
    }

    #[test]
    fn multiple_resources_sum_to_totals() {
        let mut teller = resource("Teller", 1, 2.0);
        let mut desk = resource("Desk", 1, 3.0);
        let mut e = Entity::new("a");
        let done = serve(&mut e, &mut teller, 0.0);
        let done = serve(&mut e, &mut desk, done);
        e.dispose(t(done)).unwrap();

        assert_eq!(e.visited_resources().collect::<Vec<_>>(), vec!["Teller", "Desk"]);
        assert_eq!(e.total_processing_time().unwrap(), 5.0);
        assert_eq!(e.total_time().unwrap(), 5.0);
    }

    proptest! {
        #[test]
        fn per_resource_sums_match_totals(
            gaps in proptest::collection::vec((0.0f64..5.0, 0.0f64..5.0, 0usize..3), 1..20),
        ) {
            let names = ["A", "B", "C"];
            let mut pool: Vec<Resource> = names.iter().map(|n| resource(n, 1, 1.0)).collect();
            let mut e = Entity::new("a");
            let mut now = 0.0;
            for (wait, serve_for, which) in gaps {
                let res = &mut pool[which];
                e.wait_for_resource(t(now), res, None).unwrap();
                now += wait;
                e.process_at_resource(t(now), res).unwrap();
                now += serve_for;
                e.release_resource(t(now), res).unwrap();
            }
            e.dispose(t(now)).unwrap();

            let waiting: f64 = names.iter().filter_map(|n| e.waiting_time_for(n).unwrap()).sum();
            let processing: f64 = names.iter().filter_map(|n| e.processing_time_for(n).unwrap()).sum();
            prop_assert!((waiting - e.total_waiting_time().unwrap()).abs() < 1e-9);
            prop_assert!((processing - e.total_processing_time().unwrap()).abs() < 1e-9);
            prop_assert!(
                (e.total_time().unwrap() - (waiting + processing)).abs() < 1e-6
            );
        }
    }
}
