//! Output limiter.
//!
//! Square-root voice normalization keeps loudness steady but does not bound
//! the peak: N voices in phase can sum to `sqrt(N) * volume`. The limiter
//! leaves everything below the knee untouched and bends the rest smoothly
//! toward ±1 instead of clamping it.
//!
//! # Transfer Curve
//!
//!   |x| <= knee:  y = x
//!   |x| >  knee:  y = knee + (1 - knee) * s((|x| - knee) / (1 - knee))
//!
//! where s(u) = u / (1 + |u|) is the usual rational soft clip. Since s'(0) = 1
//! the slope is continuous at the knee, and since s(u) < 1 the output never
//! reaches ±1.

/// Level below which the limiter is an exact identity.
pub const LIMITER_KNEE: f32 = 0.9;

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    sample / (1.0 + sample.abs())
}

/// Identity below [`LIMITER_KNEE`], soft saturation above.
#[inline]
pub fn soft_limit(sample: f32) -> f32 {
    let magnitude = sample.abs();
    if magnitude <= LIMITER_KNEE {
        return sample;
    }

    let headroom = 1.0 - LIMITER_KNEE;
    let bent = LIMITER_KNEE + headroom * soft_clip((magnitude - LIMITER_KNEE) / headroom);
    bent.copysign(sample)
}
