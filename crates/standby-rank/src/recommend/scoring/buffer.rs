/// Minutes of slack required between a return arrival and the latest acceptable time.
///
/// `h = clamp(1 - flex / buffer_max, 0, 1)` and the buffer is `buffer_max * h`, rounded
/// half away from zero. Negative flexibility counts as zero, i.e. the full buffer.
/// With whole-minute inputs the product lands on an integer up to float noise, so the
/// rounding only absorbs representation error and never sees a true `.5`.
pub fn required_buffer_minutes(flex_minutes: i64, buffer_max_minutes: u32) -> u32 {
    if buffer_max_minutes == 0 {
        return 0;
    }

    let flex = flex_minutes.max(0) as f64;
    let max = f64::from(buffer_max_minutes);
    let headroom = (1.0 - flex / max).clamp(0.0, 1.0);

    (max * headroom).round() as u32
}
