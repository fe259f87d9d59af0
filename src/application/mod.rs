// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination on top of the other layers:
//
//   session.rs           — the training controller (epochs,
//                          best-checkpoint tracking, early stop)
//   train_use_case.rs    — config → data → model → session
//   evaluate_use_case.rs — checkpoint + config → test loss
//
// No ML math and no printing of results here (that's Layer 1),
// apart from the optional per-epoch table.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The epoch-driven training controller
pub mod session;

// The training workflow
pub mod train_use_case;

// Scoring a saved checkpoint
pub mod evaluate_use_case;
