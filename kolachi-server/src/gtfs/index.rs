//! Identifier adjacency built once over the trip and stop-time tables.
//!
//! Answers "which trips run on route R", "which stop times belong to trip T"
//! and "which stops does route R serve" without rescanning the tables.

use std::collections::{HashMap, HashSet};

use super::model::{StopTime, Trip};

/// Route → trip → stop-time adjacency, holding positions into the
/// collections it was built from.
#[derive(Debug, Default)]
pub struct RouteIndex {
    trips_by_route: HashMap<String, Vec<usize>>,
    /// Each list is ordered by `stop_sequence`, ties in file order.
    stop_times_by_trip: HashMap<String, Vec<usize>>,
    stops_by_route: HashMap<String, HashSet<String>>,
}

impl RouteIndex {
    /// Build the index. Stop times whose trip is not in `trips` are only
    /// reachable by trip id, never through a route.
    pub fn build(trips: &[Trip], stop_times: &[StopTime]) -> Self {
        let mut trips_by_route: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, trip) in trips.iter().enumerate() {
            trips_by_route
                .entry(trip.route_id.clone())
                .or_default()
                .push(i);
        }

        let mut stop_times_by_trip: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, st) in stop_times.iter().enumerate() {
            stop_times_by_trip
                .entry(st.trip_id.clone())
                .or_default()
                .push(i);
        }
        for positions in stop_times_by_trip.values_mut() {
            positions.sort_by_key(|&i| stop_times[i].stop_sequence);
        }

        let stops_by_route: HashMap<String, HashSet<String>> = trips_by_route
            .iter()
            .map(|(route_id, trip_positions)| {
                let stops = trip_positions
                    .iter()
                    .filter_map(|&t| stop_times_by_trip.get(&trips[t].trip_id))
                    .flatten()
                    .map(|&st| stop_times[st].stop_id.clone())
                    .collect();
                (route_id.clone(), stops)
            })
            .collect();

        Self {
            trips_by_route,
            stop_times_by_trip,
            stops_by_route,
        }
    }

    /// Positions of the trips on `route_id`, in file order.
    pub fn trips_for_route(&self, route_id: &str) -> &[usize] {
        self.trips_by_route
            .get(route_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Positions of the stop times of `trip_id`, ascending by sequence.
    pub fn stop_times_for_trip(&self, trip_id: &str) -> &[usize] {
        self.stop_times_by_trip
            .get(trip_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct stop ids visited by any trip of `route_id`.
    pub fn stops_for_route(&self, route_id: &str) -> Option<&HashSet<String>> {
        self.stops_by_route.get(route_id)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Stop times come back non-decreasing by sequence whatever the file order
        #[test]
        fn sequence_non_decreasing(seqs in proptest::collection::vec(0u32..500, 0..40)) {
            let stop_times: Vec<StopTime> = seqs
                .iter()
                .enumerate()
                .map(|(i, &seq)| StopTime {
                    trip_id: "T1".to_string(),
                    stop_id: format!("S{i}"),
                    stop_sequence: seq,
                    arrival_time: String::new(),
                    departure_time: String::new(),
                })
                .collect();

            let index = RouteIndex::build(&[], &stop_times);
            let ordered = index.stop_times_for_trip("T1");

            prop_assert_eq!(ordered.len(), seqs.len());
            for pair in ordered.windows(2) {
                prop_assert!(stop_times[pair[0]].stop_sequence <= stop_times[pair[1]].stop_sequence);
            }
        }
    }
}
