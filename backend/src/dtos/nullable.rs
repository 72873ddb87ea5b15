//! Campi nullable nei payload di aggiornamento
//!
//! `Option<Option<T>>`: `None` = campo assente (invariato), `Some(None)` = `null`
//! (azzera la colonna), `Some(Some(v))` = nuovo valore.

use serde::{Deserialize, Deserializer};

/// Da usare con `#[serde(default, deserialize_with = "nullable::deserialize")]`
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
