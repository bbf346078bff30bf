//! # Rensa - Data-Driven Action Sequencing Engine
//!
//! **Rensa** executes ordered lists of heterogeneous action steps: a small,
//! re-entrant interpreter with conditional branching, index jumps, pausing,
//! fire-and-forget sub-tasks and nested sub-flows, all parameterized by a
//! typed variable system with local and shared scopes and live by-reference
//! value bindings.
//!
//! ## Core Workflow
//!
//! The engine is format-agnostic. It operates on a canonical document model
//! of a flow. The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your authoring format into a
//!     [`FlowDocument`](document::FlowDocument) (directly via serde, or by
//!     implementing [`IntoFlowDocument`](document::IntoFlowDocument) for
//!     your own structs).
//! 2.  **Build**: Use [`FlowBuilder`](document::FlowBuilder) to decode every
//!     step through the action catalog and produce a runnable
//!     [`Flow`](flow::Flow). Custom action kinds register on the catalog
//!     without touching the interpreter.
//! 3.  **Run**: Execute the flow on a tokio runtime. Runs can be paused and
//!     resumed, stopped cooperatively, jump within themselves, and drive
//!     other flows by reference.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rensa::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let document: FlowDocument = serde_json::from_str(
//!         r#"{
//!             "name": "greeter",
//!             "variables": [
//!                 { "name": "count", "value": { "type": "integer", "value": 0 } }
//!             ],
//!             "steps": [
//!                 {
//!                     "action": {
//!                         "kind": "variable",
//!                         "params": {
//!                             "target": { "index": 0, "name": "count" },
//!                             "command": "modify",
//!                             "expression": "+1"
//!                         }
//!                     }
//!                 },
//!                 {
//!                     "action": {
//!                         "kind": "debug.log",
//!                         "params": { "message": "hello from rensa" }
//!                     },
//!                     "finish_type": "stop"
//!                 }
//!             ]
//!         }"#,
//!     )?;
//!
//!     let flow = FlowBuilder::new(document).build()?;
//!     let succeeded = Arc::clone(&flow).run().await;
//!     assert!(succeeded);
//!
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod document;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod registry;
pub mod variable;
