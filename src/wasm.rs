use js_sys::Array;
use wasm_bindgen::prelude::*;

use crate::gameplay::Playfield;
use crate::level::Level;
use crate::solver::{Solver, Strategy};
use crate::state::PuzzleState;
use crate::vine::VineId;

fn ids_to_array(ids: impl IntoIterator<Item = VineId>) -> Array {
    ids.into_iter().map(|id| JsValue::from_str(id.as_ref())).collect()
}

/// A level in play, for a browser gameplay layer. Structured results cross the boundary as JSON strings.
#[wasm_bindgen]
pub struct Game {
    playfield: Playfield,
}

#[wasm_bindgen]
impl Game {
    /// Load a level from its JSON definition.
    #[wasm_bindgen(constructor)]
    pub fn new(level_json: &str) -> Result<Game, JsError> {
        let level = Level::from_json(level_json)?;
        Ok(Self { playfield: Playfield::from(level) })
    }

    /// Tap a vine. Returns the outcome as JSON.
    pub fn tap(&mut self, id: &str) -> Result<String, JsError> {
        let outcome = self.playfield.tap(&VineId::from(id))?;
        Ok(serde_json::to_string(&outcome)?)
    }

    /// Report that the animation on a vine has finished.
    #[wasm_bindgen(js_name = finishAnimation)]
    pub fn finish_animation(&mut self, id: &str) -> Result<(), JsError> {
        Ok(self.playfield.finish_animation(&VineId::from(id))?)
    }

    /// Every vine's status as a JSON object keyed by vine id.
    pub fn statuses(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.playfield.statuses())?)
    }

    /// Ids of the vines still on the board.
    #[wasm_bindgen(js_name = activeVines)]
    pub fn active_vines(&self) -> Array {
        ids_to_array(self.playfield.level().ids_of(self.playfield.active().indices()))
    }

    /// Whether the board has been cleared.
    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.playfield.is_complete()
    }

    /// Grace left to spend.
    #[wasm_bindgen(js_name = graceRemaining)]
    pub fn grace_remaining(&self) -> u32 {
        self.playfield.grace_remaining()
    }

    /// Whether the player has run out of grace.
    #[wasm_bindgen(js_name = isOutOfGrace)]
    pub fn is_out_of_grace(&self) -> bool {
        self.playfield.is_out_of_grace()
    }

    /// A vine worth tapping next, if any.
    pub fn hint(&self) -> Option<String> {
        self.playfield.hint().map(|id| id.0)
    }
}

/// Run the default solvability check on a level and return the report as JSON.
#[wasm_bindgen(js_name = checkLevel)]
pub fn check_level(level_json: &str) -> Result<String, JsError> {
    let level = Level::from_json(level_json)?;
    let report = Solver::from(&level).check(Strategy::Auto);
    Ok(serde_json::to_string(&report)?)
}

/// A clearing order for a level, as an array of vine ids.
#[wasm_bindgen(js_name = solveSequence)]
pub fn solve_sequence(level_json: &str) -> Result<Array, JsError> {
    let level = Level::from_json(level_json)?;
    let order = Solver::from(&level).solve_sequence()?;
    Ok(ids_to_array(order))
}
