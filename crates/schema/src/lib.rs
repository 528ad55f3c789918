//! Capo schema: the type registry.
//!
//! A [`Scheme`] maps every GVK the provider understands to the structural
//! definition that can marshal an anonymous payload of that kind. It is
//! assembled once from a fixed list of schema families and is read-only
//! afterwards, so a single instance can be shared across threads.

#![forbid(unsafe_code)]

mod error;
pub mod families;
pub mod fixtures;
mod scheme;

pub use error::SchemeError;
pub use scheme::{Family, Scheme, SchemeBuilder, SchemeEntry, Scope, ScopeKind};

/// Build a registry holding every family, in this order: built-in Kubernetes
/// kinds, Cluster API v1beta1, Cluster API v1beta2, OCI infrastructure, then
/// experimental OCI infrastructure.
pub fn setup_scheme() -> Scheme {
    let mut builder = SchemeBuilder::new();
    families::client_go(&mut builder);
    families::cluster_api_v1beta1(&mut builder);
    families::cluster_api_v1beta2(&mut builder);
    families::infrastructure_v1beta2(&mut builder);
    families::exp_infrastructure_v1beta2(&mut builder);
    builder.build()
}
