//! Capo API types.
//!
//! Every schema family lives in its own module, split by generation. Shapes of
//! adjacent generations overlap but are declared independently of each other:
//! the only thing tying `cluster::v1beta2` to `cluster::v1beta1` is their
//! serialized form.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod exp;
pub mod infrastructure;

pub(crate) fn is_zero(v: &i32) -> bool {
    *v == 0
}
