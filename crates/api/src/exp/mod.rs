//! Experimental OCI provider kinds: machine pools and managed (OKE) clusters.
//! They share the infrastructure group.

pub mod v1beta2;
