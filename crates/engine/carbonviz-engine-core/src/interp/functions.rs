//! Interpolation helpers:
//! - lerp_f32 / lerp_rgba (component-wise linear blend)
//! - progress (elapsed time → normalized [0, 1] position within a delayed window)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_rgba(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

/// Normalized progress of a window that opens `delay` ms after `start` and lasts
/// `duration` ms, sampled at `now`.
///
/// Returns 0 until the delay elapses and exactly 1 from `start + delay + duration` on.
/// A zero-length window jumps straight to 1 once the delay has elapsed.
#[inline]
pub fn progress(start: f64, delay: f64, duration: f64, now: f64) -> f32 {
    let local = now - start - delay;
    if local <= 0.0 {
        return if duration <= 0.0 && local == 0.0 { 1.0 } else { 0.0 };
    }
    if duration <= 0.0 || local >= duration {
        return 1.0;
    }
    (local / duration).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        assert_eq!(lerp_f32(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp_f32(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp_f32(2.0, 6.0, 0.5), 4.0);
        assert_eq!(
            lerp_rgba([0.0, 0.0, 0.0, 1.0], [1.0, 0.5, 0.0, 1.0], 0.5),
            [0.5, 0.25, 0.0, 1.0]
        );
    }

    #[test]
    fn progress_holds_before_delay_and_saturates_after() {
        assert_eq!(progress(100.0, 50.0, 200.0, 120.0), 0.0);
        assert_eq!(progress(100.0, 50.0, 200.0, 150.0), 0.0);
        assert_eq!(progress(100.0, 50.0, 200.0, 250.0), 0.5);
        assert_eq!(progress(100.0, 50.0, 200.0, 350.0), 1.0);
        assert_eq!(progress(100.0, 50.0, 200.0, 9_999.0), 1.0);
    }

    #[test]
    fn zero_duration_completes_at_delay() {
        assert_eq!(progress(0.0, 10.0, 0.0, 5.0), 0.0);
        assert_eq!(progress(0.0, 10.0, 0.0, 10.0), 1.0);
        assert_eq!(progress(0.0, 0.0, 0.0, 0.0), 1.0);
    }
}
