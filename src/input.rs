use serde_json::Value;

/// Trait for types that can be used as input to parsing and schema loading.
///
/// Implemented for JSON strings (`&str`, `String`), raw bytes (`&[u8]`) and
/// `serde_json::Value`.
pub trait JsonInput {
    /// Convert this input into a `serde_json::Value`.
    fn to_json_value(&self) -> Result<Value, serde_json::Error>;
}

impl JsonInput for Value {
    fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        Ok(self.clone())
    }
}

impl JsonInput for str {
    fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self)
    }
}

impl JsonInput for String {
    fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        self.as_str().to_json_value()
    }
}

impl JsonInput for [u8] {
    fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(self)
    }
}

impl JsonInput for Vec<u8> {
    fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        self.as_slice().to_json_value()
    }
}
