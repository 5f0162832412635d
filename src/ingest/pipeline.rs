use crate::search::types::Document;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

/// An index-ready record produced by the transform stage: the target document
/// space, the document identifier, and the body to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub index: String,
    pub id: String,
    pub body: Document,
}

/// A failed ingest call. Surfaced to the caller as the pipeline's single
/// terminal result.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("document transform failed: {0}")]
    Transform(String),
    #[error("index sink failed: {0}")]
    Sink(String),
    #[error("ingest stream factory failed: {0}")]
    Factory(String),
    #[error("ingest pipeline aborted: {0}")]
    Pipeline(String),
}

/// Maps one catalog document to an index-ready record.
pub trait DocumentTransform: Send {
    fn apply(&self, document: Document) -> Result<IndexRecord, IngestError>;
}

/// Write destination for transformed records. `finish` is called exactly once,
/// after the last record of the pipeline.
#[async_trait]
pub trait RecordSink: Send {
    async fn write(&mut self, record: IndexRecord) -> Result<(), IngestError>;
    async fn finish(&mut self) -> Result<(), IngestError>;
}

/// The transform/sink pair produced by a stream factory. Each pipeline run
/// consumes one freshly built pair; concurrent runs share nothing beyond what
/// the factory itself shares (typically the backend connection).
pub struct IngestStream {
    pub transform: Box<dyn DocumentTransform>,
    pub sink: Box<dyn RecordSink>,
}

/// Ingests a single document. Identical to [`ingest_items`] with a one-element
/// batch; kept separate because single-document ingestion is the common call
/// and logs the document id on success.
pub async fn ingest_item<F, Fut>(document: Document, stream_factory: F) -> Result<(), IngestError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<IngestStream, IngestError>>,
{
    let id = document
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_string();

    let stream = stream_factory().await?;
    run_pipeline(vec![document], stream).await?;

    tracing::info!("Ingested item {}", id);
    Ok(())
}

/// Ingests a batch of documents through one pipeline instance. The sink
/// observes the documents in the order supplied.
pub async fn ingest_items<F, Fut>(
    documents: Vec<Document>,
    stream_factory: F,
) -> Result<(), IngestError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<IngestStream, IngestError>>,
{
    let count = documents.len();
    let stream = stream_factory().await?;
    run_pipeline(documents, stream).await?;

    tracing::debug!("Ingested {} items", count);
    Ok(())
}

/// Drives source → transform → sink once.
///
/// All documents are pushed before the consumer starts, then the dropped
/// sender is the single end-of-stream marker. The spawned stage yields the one
/// completion signal through its join handle.
async fn run_pipeline(documents: Vec<Document>, stream: IngestStream) -> Result<(), IngestError> {
    let IngestStream {
        transform,
        mut sink,
    } = stream;

    let (source, mut records) = mpsc::unbounded_channel::<Document>();
    for document in documents {
        if source.send(document).is_err() {
            return Err(IngestError::Pipeline("source channel closed".to_string()));
        }
    }
    drop(source);

    let consumer = tokio::spawn(async move {
        while let Some(document) = records.recv().await {
            let record = transform.apply(document)?;
            sink.write(record).await?;
        }
        sink.finish().await
    });

    match consumer.await {
        Ok(outcome) => outcome,
        Err(join_error) => Err(IngestError::Pipeline(join_error.to_string())),
    }
}
