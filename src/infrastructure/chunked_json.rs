// Chunked JSON streaming utilities
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;

/// Create a chunked response of length-prefixed JSON frames
pub async fn chunked_json_stream<S, T>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(&msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Frames are compressed one by one, so the response itself carries no
    // Content-Encoding; clients would otherwise try to inflate the framing.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndframe+json")
        .header(header::TRANSFER_ENCODING, "chunked")
        .header("x-frame-encoding", if compress { "br" } else { "identity" })
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// One frame: 4-byte big-endian payload length, then the JSON (or its Brotli)
pub async fn serialize_chunk<T: Serialize>(msg: &T, compress: bool) -> Result<Bytes, std::io::Error> {
    let buffer = serde_json::to_vec(msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(buffer).await?
    } else {
        buffer
    };

    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(payload.len() as u32);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver<T>(mut rx: tokio::sync::mpsc::Receiver<T>, compress: bool) -> impl IntoResponse
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::bufread::BrotliDecoder;
    use bytes::Buf;
    use serde_json::{json, Value};
    use tokio::io::AsyncReadExt;

    /// Split a response body back into its frames
    fn frames(mut body: Bytes) -> Vec<Bytes> {
        let mut out = Vec::new();
        while body.remaining() >= 4 {
            let len = body.get_u32() as usize;
            out.push(body.split_to(len));
        }
        assert!(body.is_empty());
        out
    }

    #[tokio::test]
    async fn test_chunk_has_length_prefix() {
        let chunk = serialize_chunk(&json!({"type": "complete"}), false).await.unwrap();
        let len = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(len, chunk.len() - 4);
        let value: Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(value["type"], "complete");
    }

    #[tokio::test]
    async fn test_stream_from_receiver_frames_in_order() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(json!({"n": 1})).await.unwrap();
        tx.send(json!({"n": 2})).await.unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, true).await.into_response();
        assert_eq!(response.headers()["x-frame-encoding"], "br");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut seen = Vec::new();
        for frame in frames(body) {
            let mut decoder = BrotliDecoder::new(std::io::Cursor::new(frame.to_vec()));
            let mut plain = Vec::new();
            decoder.read_to_end(&mut plain).await.unwrap();
            let value: Value = serde_json::from_slice(&plain).unwrap();
            seen.push(value["n"].as_u64().unwrap());
        }
        assert_eq!(seen, vec![1, 2]);
    }
}
