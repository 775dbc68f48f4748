//! Per-resource visit timestamps.

use qs_core::{RequestId, SimTime};

/// Every visit an entity paid to one resource.
///
/// The three sequences grow independently: `arrival_time` on request,
/// `start_service_time` on grant, `finish_service_time` on release.  Index
/// `i` of each sequence belongs to the same visit.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisitRecord {
    pub resource:            String,
    pub arrival_time:        Vec<SimTime>,
    pub start_service_time:  Vec<SimTime>,
    pub finish_service_time: Vec<SimTime>,
    /// Handle of the request currently held or waiting at this resource.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) request: Option<RequestId>,
}

impl VisitRecord {
    pub fn new(resource: impl Into<String>) -> Self {
        Self { resource: resource.into(), ..Self::default() }
    }

    pub fn held_request(&self) -> Option<RequestId> {
        self.request
    }

    /// Sum of `start - arrival` over visits that reached service.
    ///
    /// Arrivals that never started service are left out.
    pub fn waiting_time(&self) -> f64 {
        self.start_service_time
            .iter()
            .zip(&self.arrival_time)
            .map(|(start, arrival)| start.since(*arrival))
            .sum()
    }

    /// Sum of `finish - start` over visits that were released.
    pub fn processing_time(&self) -> f64 {
        self.finish_service_time
            .iter()
            .zip(&self.start_service_time)
            .map(|(finish, start)| finish.since(*start))
            .sum()
    }

    /// Number of visits that ran from arrival to release.
    pub fn completed_visits(&self) -> usize {
        self.arrival_time
            .len()
            .min(self.start_service_time.len())
            .min(self.finish_service_time.len())
    }
}
