// src/store/csv_fields.rs
//! Column encodings shared with files written by earlier versions of the app

/// `Vec<String>` stored as a `|`-joined cell; an empty cell is an empty list.
pub mod pipe_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join("|"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        Ok(raw.split('|').map(str::to_string).collect())
    }
}

/// `bool` stored as the literal `True` / `False`. Anything but `True` reads
/// as false.
pub mod title_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw == "True")
    }
}
