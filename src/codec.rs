//! # Content Codec
//! src/codec.rs
//!
//! Compresión gzip del body y negociación vía `Accept-Encoding`.
//!
//! La negociación es todo-o-nada: si el token `gzip` aparece en la lista
//! separada por comas, se comprime. Quality values, `deflate`, `br` e
//! `identity` se ignoran.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Encodings que el servidor sabe producir
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    /// Valor para el header `Content-Encoding`
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }

    /// Decide el encoding a partir del header `Accept-Encoding`
    ///
    /// # Ejemplo
    /// ```
    /// use http_pool_server::codec::ContentEncoding;
    ///
    /// assert_eq!(ContentEncoding::negotiate(Some("br, gzip")), Some(ContentEncoding::Gzip));
    /// assert_eq!(ContentEncoding::negotiate(Some("deflate")), None);
    /// assert_eq!(ContentEncoding::negotiate(None), None);
    /// ```
    pub fn negotiate(accept_encoding: Option<&str>) -> Option<Self> {
        accept_encoding?
            .split(',')
            .map(str::trim)
            .any(|token| token == "gzip")
            .then_some(ContentEncoding::Gzip)
    }
}

/// Error interno del compresor
#[derive(Debug)]
pub struct CodecError(std::io::Error);

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gzip codec failure: {}", self.0)
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError(e)
    }
}

/// Comprime con gzip al nivel máximo
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Descomprime un payload gzip
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
