//! Named coordinate spaces and the registry that resolves them.
//!
//! Every space maps between its own local coordinates and a shared common
//! representation. `project` goes from the common representation into the space,
//! `unproject` comes back out, so moving a value from A to B is
//! `B.project ∘ A.unproject`.

use alloc::collections::BTreeMap;
use core::fmt;

use tracing::debug;

use crate::error::PlanError;
use crate::float::Float;
use crate::frame::{Frame, Transform};
use crate::vec::{Point2, Vec2};

/// Name of a coordinate space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpaceName(pub &'static str);

impl SpaceName {
    /// The floor plan's own units. Node positions are stored here.
    pub const MODEL: SpaceName = SpaceName("model");
    /// Pixels on the host's canvas, y pointing down.
    pub const SCREEN: SpaceName = SpaceName("screen");
    /// The common representation itself.
    pub const IDENTITY: SpaceName = SpaceName("identity");
}

impl fmt::Display for SpaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A named reference frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Space<F: Float> {
    pub name: SpaceName,
    /// Common representation to this space.
    pub project: Transform<F>,
    /// This space to the common representation.
    pub unproject: Transform<F>,
}

impl<F: Float> Space<F> {
    pub fn identity() -> Self {
        Space {
            name: SpaceName::IDENTITY,
            project: Transform::identity(),
            unproject: Transform::identity(),
        }
    }

    /// A space whose axes are `frame`, given in common coordinates.
    pub fn from_frame(name: SpaceName, frame: &Frame<F>) -> Self {
        Space {
            name,
            project: frame.unproject(),
            unproject: frame.project(),
        }
    }

    /// A space in which `frame` locates the common representation's unit square.
    pub fn viewing(name: SpaceName, frame: &Frame<F>) -> Self {
        Space {
            name,
            project: frame.project(),
            unproject: frame.unproject(),
        }
    }
}

/// Lookup table of spaces, owned by the world and rebuilt wholesale whenever the
/// viewport or model scale changes.
#[derive(Clone, Debug)]
pub struct SpaceRegistry<F: Float> {
    spaces: BTreeMap<SpaceName, Space<F>>,
    revision: u64,
}

impl<F: Float> SpaceRegistry<F> {
    pub fn new() -> Self {
        SpaceRegistry {
            spaces: BTreeMap::new(),
            revision: 0,
        }
    }

    /// Register or overwrite a space.
    pub fn put(&mut self, space: Space<F>) {
        self.spaces.insert(space.name, space);
        self.revision += 1;
    }

    /// Resolve a space by name. Unknown names resolve to the identity space so a
    /// misconfigured caller degrades to a no-op transform instead of failing the
    /// frame.
    pub fn get(&self, name: SpaceName) -> Space<F> {
        match self.spaces.get(&name) {
            Some(space) => *space,
            None => {
                if name != SpaceName::IDENTITY {
                    debug!(space = %name, "unknown space, using identity");
                }
                Space::identity()
            }
        }
    }

    pub fn contains(&self, name: SpaceName) -> bool {
        self.spaces.contains_key(&name)
    }

    /// Replace the whole table at once.
    pub fn rebuild<I: IntoIterator<Item = Space<F>>>(&mut self, spaces: I) {
        self.spaces.clear();
        for space in spaces {
            self.spaces.insert(space.name, space);
        }
        self.revision += 1;
        debug!(revision = self.revision, count = self.spaces.len(), "space registry rebuilt");
    }

    /// Bumped on every `put` and `rebuild`.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The single transform taking coordinates in `from` to coordinates in `to`.
    pub fn between(&self, from: SpaceName, to: SpaceName) -> Transform<F> {
        if from == to {
            return Transform::identity();
        }
        self.get(to).project.then(&self.get(from).unproject)
    }
}

impl<F: Float> Default for SpaceRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// The editor's pan/zoom state: which part of the model is visible and how large
/// the canvas is.
///
/// The common representation is a normalized view square: `[-1, 1]` on both axes
/// covers `radius` model units around `origin`, and maps to the largest centered
/// square that fits the canvas.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport<F: Float> {
    /// Model-space point shown at the canvas center.
    pub origin: Point2<F>,
    /// Model units from the center to the edge of the view square.
    pub radius: F,
    pub screen_width: F,
    pub screen_height: F,
}

impl<F: Float> Viewport<F> {
    pub fn new(screen_width: F, screen_height: F) -> Self {
        Viewport {
            origin: Point2::origin(),
            radius: F::from_f32(100.0),
            screen_width,
            screen_height,
        }
    }

    pub fn with_origin(mut self, origin: Point2<F>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_radius(mut self, radius: F) -> Self {
        self.radius = radius;
        self
    }

    pub fn model_frame(&self) -> Result<Frame<F>, PlanError> {
        Frame::new(
            self.origin,
            Vec2::new(self.radius, F::zero()),
            Vec2::new(F::zero(), self.radius),
        )
    }

    pub fn screen_frame(&self) -> Result<Frame<F>, PlanError> {
        let half = self.screen_width.min(self.screen_height) * F::half();
        Frame::new(
            Point2::new(self.screen_width * F::half(), self.screen_height * F::half()),
            Vec2::new(half, F::zero()),
            Vec2::new(F::zero(), -half),
        )
    }

    /// The "model" and "screen" spaces for this viewport.
    pub fn spaces(&self) -> Result<[Space<F>; 2], PlanError> {
        Ok([
            Space::viewing(SpaceName::MODEL, &self.model_frame()?),
            Space::viewing(SpaceName::SCREEN, &self.screen_frame()?),
        ])
    }

    /// Rebuild `registry` from this viewport.
    pub fn install(&self, registry: &mut SpaceRegistry<F>) -> Result<(), PlanError> {
        let spaces = self.spaces()?;
        registry.rebuild(spaces);
        Ok(())
    }
}
