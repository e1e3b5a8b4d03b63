//! Deterministic embedding backend for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::embedder::EmbeddingBackend;
use crate::{Error, Result};

/// Embedding backend producing deterministic vectors without network access.
///
/// Each vector is `[1.0, char_count, 0.0, ...]`, so tests can assert input
/// order and truncation from the second component. Request batch sizes are
/// recorded, and individual calls can be made to fail.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
    batch_sizes: Mutex<Vec<usize>>,
    calls: AtomicUsize,
    fail_on_call: Option<usize>,
    short_responses: bool,
}

impl MockEmbedder {
    /// Creates a mock producing vectors of the given dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            batch_sizes: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            fail_on_call: None,
            short_responses: false,
        }
    }

    /// Makes the zero-based `n`-th request fail with a provider error.
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Makes every response drop its last vector.
    pub fn with_short_responses(mut self) -> Self {
        self.short_responses = true;
        self
    }

    /// Batch sizes of the requests made so far.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().expect("mutex poisoned").clone()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbedder {
    fn model_name(&self) -> &str {
        "mock-embedder"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes
            .lock()
            .expect("mutex poisoned")
            .push(texts.len());

        if self.fail_on_call == Some(call) {
            return Err(Error::provider("mock", "simulated provider failure"));
        }

        let mut vectors: Vec<Vec<f32>> = texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0; self.dimensions];
                vector[0] = 1.0;
                if self.dimensions > 1 {
                    vector[1] = text.chars().count() as f32;
                }
                vector
            })
            .collect();

        if self.short_responses {
            vectors.pop();
        }

        Ok(vectors)
    }
}
