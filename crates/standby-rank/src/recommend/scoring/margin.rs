/// Bonus in `(0, 1)` for spare outbound seats: `1 / (1 + e^(-margin / 2))`.
///
/// A margin of zero gives exactly 0.5.
pub fn outbound_margin_bonus(seat_margin: i64) -> f64 {
    let x = seat_margin as f64 / 2.0;
    1.0 / (1.0 + (-x).exp())
}
