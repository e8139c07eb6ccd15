use crate::track::Feature;
use std::ops::{Mul, MulAssign};

/// Dot product and the product of norms for the common prefix of two vectors
///
fn cosine_terms(f1: &Feature, f2: &Feature) -> (f32, f32) {
    let mut divided = 0.0;
    let len = f1.len().min(f2.len());
    for i in 0..len {
        let mut block1 = f1[i];
        let block2 = &f2[i];
        block1.mul_assign(block2);
        divided += block1.reduce_add();
    }

    let f1_divisor = f1
        .iter()
        .take(len)
        .fold(0.0_f32, |acc, a| acc + a.mul(a).reduce_add());

    let f2_divisor = f2
        .iter()
        .take(len)
        .fold(0.0_f32, |acc, a| acc + a.mul(a).reduce_add());

    (divided, (f1_divisor * f2_divisor).sqrt())
}

/// Cosine similarity between two vectors
///
/// When the features distances lengths don't match, the longer feature vector is truncated to
/// shorter one when the distance is calculated. A zero vector has no direction, so the
/// similarity with it is `0.0`.
///
pub fn cosine(f1: &Feature, f2: &Feature) -> f32 {
    let (divided, divisor) = cosine_terms(f1, f2);
    if divisor > 0.0 {
        divided / divisor
    } else {
        0.0
    }
}

/// Cosine distance `1 - cosine(f1, f2)`, lays within `[0; 2]`
///
/// Returns `None` when either vector has zero norm: the distance is undefined and such a pair
/// never compares as similar.
///
pub fn cosine_distance(f1: &Feature, f2: &Feature) -> Option<f32> {
    let (divided, divisor) = cosine_terms(f1, f2);
    if divisor > 0.0 {
        Some(1.0 - divided / divisor)
    } else {
        None
    }
}
