#![allow(unused_macros)]

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let name = read_lock!(self.deobfuscated_name).clone();
/// ```
macro_rules! read_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.read().expect("Failed to acquire read lock")
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  *write_lock!(self.deobfuscated_name) = name.to_string();
/// ```
macro_rules! write_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.write().expect("Failed to acquire write lock")
    };
}

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let count = with_read!(self.listeners, |listeners| listeners.len());
/// ```
macro_rules! with_read {
    ($arc_rwlock:expr, $closure:expr) => {{
        let guard = $arc_rwlock.read().expect("Failed to acquire read lock");
        $closure(&*guard)
    }};
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  with_write!(self.listeners, |listeners| listeners.retain(|(id, _)| *id != target));
/// ```
macro_rules! with_write {
    ($arc_rwlock:expr, $closure:expr) => {{
        let mut guard = $arc_rwlock.write().expect("Failed to acquire write lock");
        $closure(&mut *guard)
    }};
}
