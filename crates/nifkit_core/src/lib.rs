//! Public library API for decoding legacy NetImmerse `.nif` models.

/// NIF stream decoding, scene graph construction, and raw cache access.
pub mod nif;
