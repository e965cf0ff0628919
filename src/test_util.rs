use std::cell::Cell;

thread_local! {
    static LIVE: Cell<isize> = Cell::new(0);
    static CLONE_COUNTDOWN: Cell<Option<usize>> = Cell::new(None);
    static DEFAULT_COUNTDOWN: Cell<Option<usize>> = Cell::new(None);
}

/// Keeps a per-thread count of live instances.
///
/// This is useful for testing code that uses things like `std::ptr::write`
/// and `std::ptr::drop_in_place`: a leak leaves the count too high, and a
/// double drop makes it too low.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Tracked(pub(crate) u32);

impl Tracked {
    pub(crate) fn new(x: u32) -> Self {
        LIVE.with(|live| live.set(live.get() + 1));
        Tracked(x)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        tick(&CLONE_COUNTDOWN, "clone");
        Tracked::new(self.0)
    }
}

impl Default for Tracked {
    fn default() -> Self {
        tick(&DEFAULT_COUNTDOWN, "default");
        Tracked::new(0)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

/// Number of `Tracked` values currently alive on this thread.
pub(crate) fn live_count() -> isize { LIVE.with(|live| live.get()) }

/// Make the `n`th call to `Tracked::clone` from now panic (counting from 1).
pub(crate) fn panic_on_clone_number(n: usize) -> CountdownGuard {
    CLONE_COUNTDOWN.with(|c| c.set(Some(n)));
    CountdownGuard(&CLONE_COUNTDOWN)
}

/// Make the `n`th call to `Tracked::default` from now panic (counting from 1).
pub(crate) fn panic_on_default_number(n: usize) -> CountdownGuard {
    DEFAULT_COUNTDOWN.with(|c| c.set(Some(n)));
    CountdownGuard(&DEFAULT_COUNTDOWN)
}

/// Disarms a countdown when dropped.
pub(crate) struct CountdownGuard(&'static std::thread::LocalKey<Cell<Option<usize>>>);

impl Drop for CountdownGuard {
    fn drop(&mut self) { self.0.with(|c| c.set(None)) }
}

fn tick(key: &'static std::thread::LocalKey<Cell<Option<usize>>>, what: &str) {
    let fire = key.with(|c| match c.get() {
        None => false,
        Some(1) => {
            c.set(None);
            true
        },
        Some(n) => {
            c.set(Some(n - 1));
            false
        },
    });
    if fire {
        panic!("Tracked::{} was told to panic", what);
    }
}
