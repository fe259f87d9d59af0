// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from a numeric CSV file to tensor batches:
//
//   .csv file
//       │
//       ▼
//   CsvLoader          → parses rows into Samples
//       │
//       ▼
//   SampleDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   AutoencoderBatcher → stacks samples into [N, D] tensors
//       │
//       ▼
//   LoaderSource       → DataLoader behind the BatchSource trait
//
// Train, valid and test each get their own independent chain.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads numeric CSV files
pub mod loader;

/// Implements Burn's Dataset trait for samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// DataLoader-backed BatchSource
pub mod source;
