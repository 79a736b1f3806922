use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lock-free single-slot cell for an `f64` written by one thread and read by
/// another. Readers always see the last complete write; the value is not
/// consumed by reading.
#[derive(Debug, Default)]
pub struct LatestValue {
    bits: AtomicU64,
    present: AtomicBool,
}

impl LatestValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
        self.present.store(true, Ordering::Release);
    }

    pub fn load(&self) -> Option<f64> {
        if self.present.load(Ordering::Acquire) {
            Some(f64::from_bits(self.bits.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    pub fn clear(&self) {
        self.present.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_until_stored() {
        let cell = LatestValue::new();
        assert_eq!(cell.load(), None);
        cell.store(42.5);
        assert_eq!(cell.load(), Some(42.5));
        assert_eq!(cell.load(), Some(42.5));
        cell.clear();
        assert_eq!(cell.load(), None);
    }

    #[test]
    fn test_reader_sees_complete_values() {
        let cell = Arc::new(LatestValue::new());
        let writer = {
            let cell = cell.clone();
            thread::spawn(move || {
                for i in 0..10_000 {
                    cell.store(i as f64 * 0.5);
                }
            })
        };
        while !writer.is_finished() {
            if let Some(v) = cell.load() {
                assert_eq!(v % 0.5, 0.0);
                assert!((0.0..5_000.0).contains(&v));
            }
        }
        writer.join().unwrap();
        assert_eq!(cell.load(), Some(9_999.0 * 0.5));
    }
}
