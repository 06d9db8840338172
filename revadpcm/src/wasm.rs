#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
fn js_error(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

/// Encode audio bytes, returning `{ frames: Uint8Array, table: string, sampleRate, sampleCount }`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn encode_wav_to_vadpcm(
    audio_bytes: &[u8],
    order: usize,
    bits: u32,
) -> Result<JsValue, JsValue> {
    let settings = crate::CompressionSettings::default()
        .with_order(order)
        .with_bits(bits);
    let options = crate::EncodeOptions::default().with_settings(settings);
    let encoded = crate::encode_from_audio(audio_bytes, options).map_err(js_error)?;

    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("frames"),
        &js_sys::Uint8Array::from(&encoded.frames[..]).into(),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("table"),
        &JsValue::from_str(&encoded.table),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleRate"),
        &JsValue::from_f64(encoded.sample_rate as f64),
    )?;
    js_sys::Reflect::set(
        &obj,
        &JsValue::from_str("sampleCount"),
        &JsValue::from_f64(encoded.sample_count as f64),
    )?;
    Ok(obj.into())
}

/// Decode a frame stream with its `.table` text to WAV bytes
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn decode_vadpcm_to_wav(
    frame_bytes: &[u8],
    table: &str,
    sample_rate: u32,
    exact: bool,
) -> Result<Vec<u8>, JsValue> {
    let mut options = crate::DecodeOptions::default();
    if exact {
        options = options.exact(crate::ReconstructOptions::default());
    }
    crate::decode_to_wav(frame_bytes, table, sample_rate, &options).map_err(js_error)
}

/// Stream information as JSON
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn get_vadpcm_info_json(frame_bytes: &[u8], table: &str) -> Result<String, JsValue> {
    let info = crate::get_vadpcm_info(frame_bytes, table).map_err(js_error)?;
    serde_json::to_string(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

// Initialize wasm-bindgen panic hook for better error messages
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
