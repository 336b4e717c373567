use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::GrainError;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, GrainError> {
    serde_json::to_vec(value).map_err(|e| GrainError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GrainError> {
    serde_json::from_slice(bytes).map_err(|e| GrainError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_of_wrong_shape_is_serialization_error() {
        let bytes = encode(&vec!["a", "b"]).unwrap();
        let result = decode::<u32>(&bytes);
        assert!(matches!(result, Err(GrainError::Serialization(_))));
    }
}
