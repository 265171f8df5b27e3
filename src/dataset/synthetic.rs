use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};
use std::f64::consts::PI;

/// A single labelled point: (x1, x2) and a label in {0, 1}
pub type LabelledPoint = ([f64; 2], u8);

const RADIUS: f64 = 5.0;
const XOR_PADDING: f64 = 0.3;
const GAUSS_CENTER: f64 = 2.0;

/// Two concentric classes: a disc of positives inside a ring of negatives
pub fn circle<R: Rng + ?Sized>(num_samples: usize, noise: f64, rng: &mut R) -> Vec<LabelledPoint> {
    let half = num_samples / 2;
    let jitter = Uniform::new_inclusive(-RADIUS, RADIUS);
    let angle = Uniform::new(0f64, 2f64 * PI);

    let mut points = Vec::with_capacity(num_samples);
    let mut push_ring = |count: usize, inner: f64, outer: f64, rng: &mut R| {
        let radius = Uniform::new(inner, outer);
        for _ in 0..count {
            let r = radius.sample(rng);
            let a = angle.sample(rng);
            let (x, y) = (r * a.sin(), r * a.cos());
            let noisy_x = x + jitter.sample(rng) * noise;
            let noisy_y = y + jitter.sample(rng) * noise;
            let inside = noisy_x.hypot(noisy_y) < RADIUS * 0.5;

            points.push(([x, y], inside as u8));
        }
    };

    push_ring(half, 0.0, RADIUS * 0.5, rng);
    push_ring(num_samples - half, RADIUS * 0.7, RADIUS, rng);

    points
}

/// Quadrant checkerboard: positive where both coordinates share a sign
pub fn xor<R: Rng + ?Sized>(num_samples: usize, noise: f64, rng: &mut R) -> Vec<LabelledPoint> {
    let coordinate = Uniform::new_inclusive(-5f64, 5f64);
    let pad = |v: f64| if v > 0f64 { v + XOR_PADDING } else { v - XOR_PADDING };

    (0..num_samples)
        .map(|_| {
            let x = pad(coordinate.sample(rng));
            let y = pad(coordinate.sample(rng));
            let noisy_x = x + coordinate.sample(rng) * noise;
            let noisy_y = y + coordinate.sample(rng) * noise;

            ([x, y], (noisy_x * noisy_y >= 0f64) as u8)
        })
        .collect()
}

/// Two isotropic gaussian blobs whose spread grows with noise
pub fn gauss<R: Rng + ?Sized>(num_samples: usize, noise: f64, rng: &mut R) -> Vec<LabelledPoint> {
    let std_dev = (0.5 + (4.0 - 0.5) * noise).sqrt();
    let half = num_samples / 2;

    let mut points = Vec::with_capacity(num_samples);
    for (count, center, label) in [
        (half, GAUSS_CENTER, 1u8),
        (num_samples - half, -GAUSS_CENTER, 0u8),
    ] {
        for _ in 0..count {
            let dx: f64 = StandardNormal.sample(rng);
            let dy: f64 = StandardNormal.sample(rng);
            points.push(([center + std_dev * dx, center + std_dev * dy], label));
        }
    }

    points
}

/// Two interleaved spiral arms, half a turn apart
pub fn spiral<R: Rng + ?Sized>(num_samples: usize, noise: f64, rng: &mut R) -> Vec<LabelledPoint> {
    let jitter = Uniform::new_inclusive(-1f64, 1f64);
    let half = num_samples / 2;

    let mut points = Vec::with_capacity(num_samples);
    for (count, delta, label) in [(half, 0f64, 1u8), (num_samples - half, PI, 0u8)] {
        for i in 0..count {
            let progress = i as f64 / count as f64;
            let r = progress * RADIUS;
            let t = 1.75 * progress * 2f64 * PI + delta;
            let x = r * t.sin() + jitter.sample(rng) * noise;
            let y = r * t.cos() + jitter.sample(rng) * noise;

            points.push(([x, y], label));
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generators_produce_exactly_the_requested_count() {
        let mut rng = StdRng::seed_from_u64(3);
        for n in [0, 1, 7, 200] {
            assert_eq!(circle(n, 0.1, &mut rng).len(), n);
            assert_eq!(xor(n, 0.1, &mut rng).len(), n);
            assert_eq!(gauss(n, 0.1, &mut rng).len(), n);
            assert_eq!(spiral(n, 0.1, &mut rng).len(), n);
        }
    }

    #[test]
    fn noiseless_circle_labels_by_radius() {
        let mut rng = StdRng::seed_from_u64(11);
        for ([x, y], label) in circle(200, 0.0, &mut rng) {
            let r = x.hypot(y);
            if label == 1 {
                assert!(r < RADIUS * 0.5);
            } else {
                assert!(r >= RADIUS * 0.7 - 1e-9);
            }
        }
    }

    #[test]
    fn noiseless_xor_labels_by_quadrant() {
        let mut rng = StdRng::seed_from_u64(5);
        for ([x, y], label) in xor(100, 0.0, &mut rng) {
            assert_eq!(label == 1, x * y >= 0.0);
            assert!(x.abs() >= XOR_PADDING && y.abs() >= XOR_PADDING);
        }
    }

    #[test]
    fn gauss_and_spiral_are_balanced() {
        let mut rng = StdRng::seed_from_u64(9);
        let positives = |pts: &[LabelledPoint]| pts.iter().filter(|(_, l)| *l == 1).count();

        assert_eq!(positives(&gauss(200, 0.25, &mut rng)), 100);
        assert_eq!(positives(&spiral(200, 0.25, &mut rng)), 100);
    }
}
