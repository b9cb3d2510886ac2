//! Various unsorted logical operators.

pub(crate) use self::weighted_value::WeightedValue;

mod weighted_value;
