//! Non-persistent geometric primitives used to express locator queries.
//!
//! Line queries are expressed with a finite [`Segment`]: every parameter `t`
//! reported by a query lies in `[0, 1]` and maps to `segment.point_at(t)`.

pub use self::segment::Segment;

mod segment;
