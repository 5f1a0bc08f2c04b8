pub mod document;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod options;
pub mod parser;
pub mod track_types;

use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::Gpx2SceneError;
use crate::normalizer::NormalizedTrack;
use crate::options::NormalizeOptions;
use crate::track_types::Track;

/// Extracted track together with its scene-space projection.
#[derive(Debug, Serialize)]
pub struct Scene {
    pub track: Track,
    pub normalized: NormalizedTrack,
}

/// Run the full pipeline on GPX text. Malformed XML is reported through `track.error`;
/// only options that fail validation produce an `Err`.
pub fn build_scene(gpx_string: &str, opts: &NormalizeOptions) -> Result<Scene, Gpx2SceneError> {
    opts.validate()?;
    let track = extractor::load_track(gpx_string);
    let normalized = normalizer::normalize(&track, opts);
    Ok(Scene { track, normalized })
}

/// Extract the track from a GPX string, returned as a JS object.
#[wasm_bindgen(js_name = gpxToTrack)]
pub fn gpx_to_track(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let track = extractor::load_track(gpx_string);
    serde_wasm_bindgen::to_value(&track).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract and normalize a GPX string, returned as a JS object.
#[wasm_bindgen(js_name = gpxToScene)]
pub fn gpx_to_scene(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let scene = build_scene(gpx_string, &opts)?;
    serde_wasm_bindgen::to_value(&scene).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract and normalize a GPX string, returned as a JSON string.
#[wasm_bindgen(js_name = gpxToSceneString)]
pub fn gpx_to_scene_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let scene = build_scene(gpx_string, &opts)?;
    serde_json::to_string(&scene).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Flat x,y,z vertex buffer of the whole track, segments joined in order.
#[wasm_bindgen(js_name = gpxToPositions)]
pub fn gpx_to_positions(gpx_string: &str, options: JsValue) -> Result<Float64Array, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let scene = build_scene(gpx_string, &opts)?;
    Ok(Float64Array::from(scene.normalized.positions().as_slice()))
}

fn parse_options(options: JsValue) -> Result<NormalizeOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(NormalizeOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
