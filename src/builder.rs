use crate::direction::Heading;
use crate::level::{validate, Level, LevelDefinition, Mask, MaskMode, StructuralError};
use crate::location::{Dimension, GridSize, Point};
use crate::vine::Vine;

/// A builder for levels, mostly useful for tests and authoring tools which assemble boards programmatically.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
#[derive(Clone, Debug)]
pub struct LevelBuilder {
    definition: LevelDefinition,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self::with_dims((Dimension::MIN.saturating_add(4), Dimension::MIN.saturating_add(4)))
    }
}

impl LevelBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(width, height)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            definition: LevelDefinition {
                id: 0,
                name: None,
                grid_size: GridSize { width: dims.0, height: dims.1 },
                mask: None,
                vines: Vec::new(),
                max_moves: None,
                min_moves: None,
                grace: 3,
            },
        }
    }

    /// Add a vine whose path is given head first as `(x, y)` pairs.
    ///
    /// Nothing is checked here; [`Self::build`] reports every structural problem at once.
    pub fn add_vine(&mut self, id: &str, heading: impl Into<Heading>, path: &[(i32, i32)]) -> &mut Self {
        self.definition.vines.push(Vine::new(id, heading, path.iter().copied().map(Point::from).collect()));
        self
    }

    /// Remove the most recently added vine.
    ///
    /// If no vines are present, this function does nothing.
    pub fn pop_vine(&mut self) -> &mut Self {
        self.definition.vines.pop();
        self
    }

    /// Hide `location` from the board. Switches the mask to [`MaskMode::Hide`], dropping any other mask.
    pub fn hide(&mut self, location: (i32, i32)) -> &mut Self {
        let mask = self.definition.mask.get_or_insert_with(|| Mask { mode: MaskMode::Hide, points: Vec::new() });
        if mask.mode != MaskMode::Hide {
            *mask = Mask { mode: MaskMode::Hide, points: Vec::new() };
        }
        mask.points.push(Point::from(location));
        self
    }

    /// Set the blocked-tap allowance.
    pub fn grace(&mut self, grace: u32) -> &mut Self {
        self.definition.grace = grace;
        self
    }

    /// Set the numeric level id.
    pub fn id(&mut self, id: u32) -> &mut Self {
        self.definition.id = id;
        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns an empty [`Vec`] if the builder is valid, otherwise every [`StructuralError`] found.
    pub fn invalid_reasons(&self) -> Vec<StructuralError> {
        validate(&self.definition)
    }

    /// Convert the state of this builder into a [`Level`].
    /// If the builder is invalid for any reason, a [`Vec`] of [`StructuralError`] will indicate why.
    pub fn build(&self) -> Result<Level, Vec<StructuralError>> {
        Level::try_from(self.definition.clone())
    }
}
