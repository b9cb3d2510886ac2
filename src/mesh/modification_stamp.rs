use core::sync::atomic::{AtomicU64, Ordering};

static LAST_STAMP: AtomicU64 = AtomicU64::new(0);

/// A process-wide, monotonically increasing modification marker.
///
/// Every call to [`ModificationStamp::next`] returns a stamp greater than all
/// the stamps issued before it, from any thread. Meshes take a new stamp each
/// time their geometry changes, and the locator compares it against the stamp
/// taken when its search structure was built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ModificationStamp(u64);

impl ModificationStamp {
    /// The stamp older than every issued stamp.
    pub const ZERO: Self = ModificationStamp(0);

    /// Issues a new stamp.
    #[inline]
    pub fn next() -> Self {
        ModificationStamp(LAST_STAMP.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Replaces `self` with a newly issued stamp.
    #[inline]
    pub fn modified(&mut self) {
        *self = Self::next();
    }

    /// The raw value of this stamp.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}
