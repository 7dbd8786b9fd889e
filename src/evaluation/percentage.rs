//! Stable percentage bucketing.
//!
//! Buckets come from a DJB2 hash over the UTF-16 code units of
//! `"{flag_key}:{identifier}"`, wrapped to 32 bits and reduced modulo 100.
//! The exact hash is an external contract: changing it reshuffles every
//! identifier already enrolled in a partial rollout.

const BUCKET_COUNT: u32 = 100;
const DJB2_SEED: u32 = 5381;

fn hash_string(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(DJB2_SEED, |hash, unit| hash.wrapping_mul(33).wrapping_add(u32::from(unit)))
}

/// Bucket in `0..100` for an identifier under a flag. Depends on nothing but the two strings.
pub fn bucket(flag_key: &str, identifier: &str) -> u32 {
    hash_string(&format!("{}:{}", flag_key, identifier)) % BUCKET_COUNT
}

/// Whether the identifier falls inside a rollout of `percentage` percent.
///
/// Inclusion is upward-closed: an identifier included at `p` stays included
/// for every percentage above `p`, so raising a rollout never evicts anyone.
/// Fractional percentages compare against the integer bucket, so `12.5`
/// admits buckets `0..=12`. NaN admits nobody.
pub fn is_in_percentage(flag_key: &str, identifier: &str, percentage: f64) -> bool {
    if percentage.is_nan() || percentage <= 0.0 {
        return false;
    }
    if percentage >= 100.0 {
        return true;
    }

    f64::from(bucket(flag_key, identifier)) < percentage
}
