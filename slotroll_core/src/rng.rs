use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// All engine randomness flows through a RandomSource so tests can script it.
// Sources take &self and must be Send + Sync: one instance is shared by every
// session's roll sequence.

pub trait RandomSource: Send + Sync {
    /// Uniform value in [0, 1).
    fn next_f64(&self) -> f64;

    /// Uniform index in [0, len). `len` must be non-zero.
    fn next_index(&self, len: usize) -> usize {
        ((self.next_f64() * len as f64).floor() as usize) % len
    }
}

impl<R: RandomSource + ?Sized> RandomSource for std::sync::Arc<R> {
    fn next_f64(&self) -> f64 {
        (**self).next_f64()
    }

    fn next_index(&self, len: usize) -> usize {
        (**self).next_index(len)
    }
}

/// Thread-local OS-seeded generator. No state is shared between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn next_index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible stream for simulations.
#[derive(Debug)]
pub struct SeededRandom {
    inner: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        self.inner.lock().gen::<f64>()
    }

    fn next_index(&self, len: usize) -> usize {
        self.inner.lock().gen_range(0..len)
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Debug)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: Mutex<usize>,
}

impl ScriptedRandom {
    /// Values are clamped into [0, 1). An empty script always yields 0.0.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            values,
            cursor: Mutex::new(0),
        }
    }

    /// Script that picks `indices` out of a set of `len` symbols, in order.
    pub fn picking(len: usize, indices: &[usize]) -> Self {
        let values: Vec<f64> = indices
            .iter()
            .map(|&i| (i as f64 + 0.5) / len as f64)
            .collect();
        Self::new(values)
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        *self.cursor.lock()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        let mut cursor = self.cursor.lock();
        let value = if self.values.is_empty() {
            0.0
        } else {
            self.values[*cursor % self.values.len()]
        };
        *cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_determinism() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let xs: Vec<f64> = (0..5).map(|_| a.next_f64()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.next_f64()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn thread_random_in_range() {
        let rng = ThreadRandom;
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
            assert!(rng.next_index(4) < 4);
        }
    }

    #[test]
    fn scripted_wraps() {
        let rng = ScriptedRandom::new(vec![0.1, 0.9]);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn scripted_picking() {
        let rng = ScriptedRandom::picking(4, &[3, 0, 2]);
        assert_eq!(rng.next_index(4), 3);
        assert_eq!(rng.next_index(4), 0);
        assert_eq!(rng.next_index(4), 2);
    }
}
