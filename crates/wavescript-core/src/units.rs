#[must_use]
pub fn samples_to_seconds(samples: u64, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }

    samples as f64 / f64::from(sample_rate)
}

#[must_use]
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> u64 {
    if seconds <= 0.0 || sample_rate == 0 {
        return 0;
    }

    (seconds * f64::from(sample_rate)).round() as u64
}

#[must_use]
pub fn millis_to_samples(millis: u64, sample_rate: u32) -> u64 {
    seconds_to_samples(millis as f64 / 1_000.0, sample_rate)
}

#[must_use]
pub fn samples_to_millis(samples: u64, sample_rate: u32) -> u64 {
    (samples_to_seconds(samples, sample_rate) * 1_000.0).round() as u64
}

#[must_use]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[must_use]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        return f32::NEG_INFINITY;
    }

    20.0 * gain.log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_second_round_trip_is_stable() {
        let sample_rate = 48_000;
        let samples = 96_123;
        let seconds = samples_to_seconds(samples, sample_rate);
        let restored = seconds_to_samples(seconds, sample_rate);
        assert_eq!(samples, restored);
    }

    #[test]
    fn millis_convert_to_samples() {
        assert_eq!(millis_to_samples(10, 48_000), 480);
        assert_eq!(samples_to_millis(480, 48_000), 10);
    }

    #[test]
    fn db_gain_round_trip_is_close() {
        let gain = db_to_gain(-6.0);
        assert!((gain - 0.501_187).abs() < 1e-4);
        assert!((gain_to_db(gain) + 6.0).abs() < 1e-4);
    }

    #[test]
    fn zero_gain_maps_to_negative_infinity() {
        assert_eq!(gain_to_db(0.0), f32::NEG_INFINITY);
    }
}
