use std::cmp::Ordering;

use super::domain::Recommendation;

/// Order recommendations best first.
///
/// Sorting is by descending trip score. Starting from the best remaining item, every
/// following item whose score is within `epsilon` (strictly less) of that leader joins
/// its tie group. Inside a group the order is:
///
/// 1. higher return success probability
/// 2. higher outbound seat margin
/// 3. earlier outbound departure
/// 4. earlier position in the input
///
/// The last key makes the order total, so identical inputs always rank identically.
pub fn rank_recommendations(
    recommendations: Vec<Recommendation>,
    epsilon: f64,
) -> Vec<Recommendation> {
    let mut indexed: Vec<(usize, Recommendation)> =
        recommendations.into_iter().enumerate().collect();
    indexed.sort_by(|(_, a), (_, b)| b.trip_score.total_cmp(&a.trip_score));

    let mut ranked = Vec::with_capacity(indexed.len());
    let mut remaining = indexed.into_iter().peekable();

    while let Some(leader) = remaining.next() {
        let anchor = leader.1.trip_score;
        let mut group = vec![leader];
        while let Some(next) =
            remaining.next_if(|(_, candidate)| (anchor - candidate.trip_score).abs() < epsilon)
        {
            group.push(next);
        }

        if group.len() > 1 {
            group.sort_by(|(left_index, left), (right_index, right)| {
                tie_break(left, right).then(left_index.cmp(right_index))
            });
        }

        ranked.extend(group.into_iter().map(|(_, recommendation)| recommendation));
    }

    ranked
}

fn tie_break(left: &Recommendation, right: &Recommendation) -> Ordering {
    right
        .return_success_probability()
        .total_cmp(&left.return_success_probability())
        .then(right.seat_margin.cmp(&left.seat_margin))
        .then(
            left.outbound
                .departure_time
                .cmp(&right.outbound.departure_time),
        )
}
