// ============================================================
// Layer 4 — DataLoader-backed Batch Source
// ============================================================
// Wraps Burn's DataLoader so it satisfies the BatchSource
// capability the trainer works against.
//
//   SampleDataset ──► AutoencoderBatcher ──► DataLoader ──► LoaderSource
//
// No shuffling: every pass sees the batches in file order,
// so runs are reproducible. The final batch may be shorter
// than batch_size.
//
// num_workers = 0 keeps loading on the calling thread; any
// other value lets Burn prefetch batches on worker threads,
// which changes timing but not batch order or content.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use std::sync::Arc;

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::{
    batcher::{AutoencoderBatch, AutoencoderBatcher},
    dataset::SampleDataset,
};
use crate::domain::traits::BatchSource;

pub struct LoaderSource<O> {
    loader:     Arc<dyn DataLoader<O>>,
    batch_size: usize,
}

impl<O> BatchSource<O> for LoaderSource<O> {
    fn batches(&self) -> Box<dyn Iterator<Item = O> + '_> {
        Box::new(self.loader.iter())
    }

    fn len(&self) -> usize {
        self.loader.num_items().div_ceil(self.batch_size)
    }
}

/// Build a batch source on `device` from an in-memory dataset.
/// `batch_size` must be non-zero (checked by TrainConfig::validate).
pub fn loader_source<B: Backend>(
    dataset:     SampleDataset,
    batch_size:  usize,
    num_workers: usize,
    device:      B::Device,
) -> LoaderSource<AutoencoderBatch<B>> {
    let batcher = AutoencoderBatcher::<B>::new(device);
    let mut builder = DataLoaderBuilder::new(batcher).batch_size(batch_size);
    if num_workers > 0 {
        builder = builder.num_workers(num_workers);
    }

    LoaderSource { loader: builder.build(dataset), batch_size }
}
