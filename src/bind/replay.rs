//! Replayable payload buffer.

use std::io::{Cursor, Read};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::binder::{bind, bind_slice, BindError};
use super::decoder::Decoder;
use crate::protect::Protector;
use crate::reflect::Reflect;

/// ReplayableBody buffers a payload once so it can be bound any number of
/// times, e.g. with different tags or into different destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayableBody {
    bytes: Vec<u8>,
}

impl ReplayableBody {
    /// Creates a new body from buffered bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        ReplayableBody {
            bytes: bytes.into(),
        }
    }

    /// Reads `reader` to the end and buffers its content.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, BindError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(ReplayableBody { bytes })
    }

    /// Returns the buffered bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns a fresh reader positioned at the start of the payload.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.bytes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Binds the buffered payload into `dst`. See [`bind`].
    pub fn bind<T>(&self, protector: &Protector, tag: &str, decoder: &dyn Decoder, dst: &mut T) -> Result<(), BindError>
    where
        T: Reflect + Default + Serialize + DeserializeOwned,
    {
        bind(protector, tag, decoder, &self.bytes, dst)
    }

    /// Binds the buffered payload array into `dst`. See [`bind_slice`].
    pub fn bind_slice<T>(
        &self,
        protector: &Protector,
        tag: &str,
        decoder: &dyn Decoder,
        dst: &mut Vec<T>,
        policy: &str,
    ) -> Result<(), BindError>
    where
        T: Reflect + Clone + Default + DeserializeOwned,
    {
        bind_slice(protector, tag, decoder, &self.bytes, dst, policy)
    }
}
