//! Keycode label mapping for the config file.
//!
//! Hotkeys persist as human-readable labels ("Tab", "W", "F5") rather than
//! enum discriminants, so a hand-edited config file stays legible. A config
//! containing an unknown label fails deserialization as a whole and the
//! loader falls back to defaults.

use bevy::prelude::*;

/// Every key the camera can bind, paired with its config-file label.
const KEY_LABELS: &[(KeyCode, &str)] = &[
    (KeyCode::KeyA, "A"),
    (KeyCode::KeyB, "B"),
    (KeyCode::KeyC, "C"),
    (KeyCode::KeyD, "D"),
    (KeyCode::KeyE, "E"),
    (KeyCode::KeyF, "F"),
    (KeyCode::KeyG, "G"),
    (KeyCode::KeyH, "H"),
    (KeyCode::KeyI, "I"),
    (KeyCode::KeyJ, "J"),
    (KeyCode::KeyK, "K"),
    (KeyCode::KeyL, "L"),
    (KeyCode::KeyM, "M"),
    (KeyCode::KeyN, "N"),
    (KeyCode::KeyO, "O"),
    (KeyCode::KeyP, "P"),
    (KeyCode::KeyQ, "Q"),
    (KeyCode::KeyR, "R"),
    (KeyCode::KeyS, "S"),
    (KeyCode::KeyT, "T"),
    (KeyCode::KeyU, "U"),
    (KeyCode::KeyV, "V"),
    (KeyCode::KeyW, "W"),
    (KeyCode::KeyX, "X"),
    (KeyCode::KeyY, "Y"),
    (KeyCode::KeyZ, "Z"),
    (KeyCode::Digit0, "0"),
    (KeyCode::Digit1, "1"),
    (KeyCode::Digit2, "2"),
    (KeyCode::Digit3, "3"),
    (KeyCode::Digit4, "4"),
    (KeyCode::Digit5, "5"),
    (KeyCode::Digit6, "6"),
    (KeyCode::Digit7, "7"),
    (KeyCode::Digit8, "8"),
    (KeyCode::Digit9, "9"),
    (KeyCode::F1, "F1"),
    (KeyCode::F2, "F2"),
    (KeyCode::F3, "F3"),
    (KeyCode::F4, "F4"),
    (KeyCode::F5, "F5"),
    (KeyCode::F6, "F6"),
    (KeyCode::F7, "F7"),
    (KeyCode::F8, "F8"),
    (KeyCode::F9, "F9"),
    (KeyCode::F10, "F10"),
    (KeyCode::F11, "F11"),
    (KeyCode::F12, "F12"),
    (KeyCode::ArrowUp, "Up"),
    (KeyCode::ArrowDown, "Down"),
    (KeyCode::ArrowLeft, "Left"),
    (KeyCode::ArrowRight, "Right"),
    (KeyCode::Space, "Space"),
    (KeyCode::Tab, "Tab"),
    (KeyCode::Escape, "Esc"),
    (KeyCode::Enter, "Enter"),
    (KeyCode::Backspace, "Backspace"),
    (KeyCode::Home, "Home"),
    (KeyCode::End, "End"),
    (KeyCode::PageUp, "PageUp"),
    (KeyCode::PageDown, "PageDown"),
    (KeyCode::Insert, "Insert"),
    (KeyCode::Delete, "Delete"),
    (KeyCode::CapsLock, "CapsLock"),
    (KeyCode::ShiftLeft, "LShift"),
    (KeyCode::ShiftRight, "RShift"),
    (KeyCode::ControlLeft, "LCtrl"),
    (KeyCode::ControlRight, "RCtrl"),
    (KeyCode::AltLeft, "LAlt"),
    (KeyCode::AltRight, "RAlt"),
    (KeyCode::Backquote, "`"),
    (KeyCode::Minus, "-"),
    (KeyCode::Equal, "="),
    (KeyCode::NumpadAdd, "Num+"),
    (KeyCode::NumpadSubtract, "Num-"),
];

/// Label for a bindable key, or "Unknown" for keys outside the table.
pub fn keycode_label(key: KeyCode) -> &'static str {
    KEY_LABELS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, label)| *label)
        .unwrap_or("Unknown")
}

/// Reverse lookup for config loading.
pub fn keycode_from_label(label: &str) -> Option<KeyCode> {
    KEY_LABELS
        .iter()
        .find(|(_, candidate)| *candidate == label)
        .map(|(key, _)| *key)
}

/// Serde adapter used via `#[serde(with = "keycode_serde")]` on hotkey fields.
pub mod keycode_serde {
    use bevy::prelude::KeyCode;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(key: &KeyCode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::keycode_label(*key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<KeyCode, D::Error> {
        let label = String::deserialize(deserializer)?;
        super::keycode_from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown key label '{label}'")))
    }
}
