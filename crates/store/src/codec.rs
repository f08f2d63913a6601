// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codecs turning stored values into bytes and back
//!
//! A cell writes exactly the bytes its codec produces. Sequences wrap the
//! element codec in a [`ChunkCodec`], which frames a chunk as a JSON array of
//! strings, one independently encoded element per string.

use crate::error::CodecError;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Encode/decode capability for one value type
///
/// Implementations must be pure: `decode(encode(v))` yields a value equal to `v`.
pub trait Codec: Send + Sync + 'static {
    type Value: Send + Sync + 'static;

    fn encode(&self, value: &Self::Value) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Value, CodecError>;
}

/// Serde JSON codec
pub struct JsonCodec<T> {
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonCodec")
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Plain UTF-8 text, stored as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    type Value = String;

    fn encode(&self, value: &String) -> Result<Vec<u8>, CodecError> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// Codec for the element list held by one chunk
///
/// On disk a chunk is a JSON array of strings. Each string is the element
/// codec's output, so every element stays individually decodable. Element
/// encodings must be valid UTF-8.
#[derive(Debug, Clone, Default)]
pub struct ChunkCodec<C> {
    element: C,
}

impl<C: Codec> ChunkCodec<C> {
    pub fn new(element: C) -> Self {
        Self { element }
    }

    /// The wrapped element codec
    pub fn element(&self) -> &C {
        &self.element
    }
}

impl<C: Codec> Codec for ChunkCodec<C> {
    type Value = Vec<C::Value>;

    fn encode(&self, value: &Vec<C::Value>) -> Result<Vec<u8>, CodecError> {
        let encoded = value
            .iter()
            .map(|elem| -> Result<String, CodecError> {
                Ok(String::from_utf8(self.element.encode(elem)?)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(serde_json::to_vec(&encoded)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<C::Value>, CodecError> {
        let encoded: Vec<String> = serde_json::from_slice(bytes)?;
        encoded
            .iter()
            .map(|elem| self.element.decode(elem.as_bytes()))
            .collect()
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
