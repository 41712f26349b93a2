// ============================================================================
// WASM API - entry points for the demo front end
// ============================================================================

use wasm_bindgen::prelude::*;

use crate::allocation::Allocation;
use crate::generate::demo_rows;
use crate::input::Instance;
use crate::procedure::bidding_for_envy_freeness;

/// Run the compensation procedure on bids from JS.
///
/// Accepts either `number[][]` or `{ [agent]: { [item]: number } }`.
#[wasm_bindgen(js_name = allocateBids)]
pub fn allocate_bids(instance: Instance) -> Result<Allocation, JsError> {
    console_error_panic_hook::set_once();
    let matrix = instance.into_matrix()?;
    Ok(bidding_for_envy_freeness(&matrix)?)
}

/// Seeded square bid table for the "random bids" button.
#[wasm_bindgen(js_name = randomBids)]
pub fn random_bids(size: u32, seed: u64) -> Result<JsValue, JsError> {
    Ok(serde_wasm_bindgen::to_value(&demo_rows(size as usize, seed))?)
}
