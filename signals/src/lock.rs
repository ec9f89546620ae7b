//! The exclusive lock guarding a registry's sections. Selected per signal through [`LockFamily`].
//!
//! Poisoned std locks are recovered. The only caller code run under the lock is the group comparator,
//! and it runs before any section is modified.

/// Scoped exclusive access to a value.
pub trait Lock<T>: Send + Sync {
    fn new(value: T) -> Self;

    /// Run `f` with exclusive access. The lock is released when `f` returns.
    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

/// Chooses the lock type a registry stores its state in.
pub trait LockFamily: Send + Sync + 'static {
    type Lock<T: Send + Sync>: Lock<T>;
}

impl<T: Send> Lock<T> for std::sync::Mutex<T> {
    fn new(value: T) -> Self { std::sync::Mutex::new(value) }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<T: Send + Sync> Lock<T> for std::sync::RwLock<T> {
    fn new(value: T) -> Self { std::sync::RwLock::new(value) }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(feature = "parking_lot")]
impl<T: Send> Lock<T> for parking_lot::Mutex<T> {
    fn new(value: T) -> Self { parking_lot::Mutex::new(value) }

    fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R { f(&mut self.lock()) }
}

/// `std::sync::Mutex`, the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdMutex;

impl LockFamily for StdMutex {
    type Lock<T: Send + Sync> = std::sync::Mutex<T>;
}

/// `std::sync::RwLock`, always taken for writing.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdRwLock;

impl LockFamily for StdRwLock {
    type Lock<T: Send + Sync> = std::sync::RwLock<T>;
}

/// `parking_lot::Mutex`, which never poisons.
#[cfg(feature = "parking_lot")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ParkingLot;

#[cfg(feature = "parking_lot")]
impl LockFamily for ParkingLot {
    type Lock<T: Send + Sync> = parking_lot::Mutex<T>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump<L: LockFamily>() -> u32 {
        let lock = <L::Lock<u32> as Lock<u32>>::new(1);
        lock.with(|value| *value += 1);
        lock.with(|value| *value)
    }

    #[test]
    fn test_families() {
        assert_eq!(bump::<StdMutex>(), 2);
        assert_eq!(bump::<StdRwLock>(), 2);
        #[cfg(feature = "parking_lot")]
        assert_eq!(bump::<ParkingLot>(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let lock = <std::sync::Mutex<u32> as Lock<u32>>::new(4);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            lock.with(|value| {
                if *value == 4 {
                    panic!("inside the lock");
                }
            })
        }));
        assert!(result.is_err());
        assert!(lock.is_poisoned());
        assert_eq!(lock.with(|value| *value), 4);
    }
}
