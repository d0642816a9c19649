//! Local answerer for feature-count requests.
//!
//! Without a feature service to query, the standalone binary annotates the
//! selection with the ground area it covers.

use std::thread::JoinHandle;

use crate::controllers::FeatureCountController;
use crate::data::selection::SelectionSet;

/// Kilometres per degree of latitude (mean).
const KM_PER_DEGREE: f64 = 111.32;

/// Approximate ground area of the selection in km².
pub fn approximate_area_km2(cells: &SelectionSet) -> f64 {
    cells
        .iter()
        .map(|cell| {
            let size = cell.size();
            let mid_lat = (cell.lat() + size / 2.0).to_radians();
            (size * KM_PER_DEGREE) * (size * KM_PER_DEGREE * mid_lat.cos())
        })
        .sum()
}

pub fn coverage_summary(cells: &SelectionSet) -> String {
    format!("Covers about {:.0} km².", approximate_area_km2(cells))
}

/// Answer every request on a detached background thread. The thread holds a
/// handle to `counts`, so it lives as long as the process.
pub fn spawn_coverage_responder(counts: FeatureCountController) -> JoinHandle<()> {
    let requests = counts.subscribe();
    std::thread::spawn(move || {
        for req in requests {
            let answer = SelectionSet::parse(&req.token)
                .map(|cells| coverage_summary(&cells))
                .map_err(|e| e.to_string());
            counts.respond(req.id, answer);
        }
    })
}
