//! Cached shape payloads.
//!
//! Each payload is built once per shape snapshot and parameter set, then
//! shared as an `Arc` until the shape changes.

use crate::{
    PreStrokedShape, StrokeGeometryFlags, TessellatedShape, TessellationParams, Triangulation,
};
use std::sync::Arc;
use tessera_core::alloc::HashMap;

/// Kind of payload derived from a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// [`TessellatedShape`].
    Tessellated,
    /// [`PreStrokedShape`].
    PreStroked,
    /// [`Triangulation`].
    Triangulated,
}

/// Cache key: payload kind plus every parameter the payload depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadKey {
    kind: PayloadKind,
    params: TessellationParams,
    flags: StrokeGeometryFlags,
}

impl PayloadKey {
    /// Key of a tessellation.
    pub fn tessellated(params: &TessellationParams) -> Self {
        Self {
            kind: PayloadKind::Tessellated,
            params: *params,
            flags: StrokeGeometryFlags::empty(),
        }
    }

    /// Key of a pre-stroke.
    pub fn pre_stroked(params: &TessellationParams, flags: StrokeGeometryFlags) -> Self {
        Self {
            kind: PayloadKind::PreStroked,
            params: *params,
            flags,
        }
    }

    /// Key of a triangulation.
    pub fn triangulated(params: &TessellationParams) -> Self {
        Self {
            kind: PayloadKind::Triangulated,
            params: *params,
            flags: StrokeGeometryFlags::empty(),
        }
    }

    /// Kind of payload the key refers to.
    pub fn kind(&self) -> PayloadKind {
        self.kind
    }
}

/// A shared, immutable payload.
#[derive(Debug, Clone)]
pub enum ShapePayload {
    /// Tessellated outlines.
    Tessellated(Arc<TessellatedShape>),
    /// Join and cap geometry.
    PreStroked(Arc<PreStrokedShape>),
    /// Winding-grouped triangles.
    Triangulated(Arc<Triangulation>),
}

impl ShapePayload {
    /// Kind of the payload.
    pub fn kind(&self) -> PayloadKind {
        match self {
            ShapePayload::Tessellated(_) => PayloadKind::Tessellated,
            ShapePayload::PreStroked(_) => PayloadKind::PreStroked,
            ShapePayload::Triangulated(_) => PayloadKind::Triangulated,
        }
    }

    /// The tessellation, if this is one.
    pub fn as_tessellated(&self) -> Option<&Arc<TessellatedShape>> {
        match self {
            ShapePayload::Tessellated(payload) => Some(payload),
            _ => None,
        }
    }

    /// The pre-stroke, if this is one.
    pub fn as_pre_stroked(&self) -> Option<&Arc<PreStrokedShape>> {
        match self {
            ShapePayload::PreStroked(payload) => Some(payload),
            _ => None,
        }
    }

    /// The triangulation, if this is one.
    pub fn as_triangulated(&self) -> Option<&Arc<Triangulation>> {
        match self {
            ShapePayload::Triangulated(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Payloads built for one shape snapshot.
#[derive(Debug, Clone, Default)]
pub struct PayloadCache {
    entries: HashMap<PayloadKey, ShapePayload>,
}

impl PayloadCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached payload for `key`.
    pub fn get(&self, key: &PayloadKey) -> Option<&ShapePayload> {
        self.entries.get(key)
    }

    /// Store a payload, replacing any previous one for `key`.
    pub fn insert(&mut self, key: PayloadKey, payload: ShapePayload) {
        debug_assert_eq!(key.kind(), payload.kind());
        self.entries.insert(key, payload);
    }

    /// Drop every payload.
    pub fn clear(&mut self) {
        if !self.is_empty() {
            tracing::trace!("Invalidating {} cached payloads", self.entries.len());
        }
        self.entries.clear();
    }

    /// Number of cached payloads.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
