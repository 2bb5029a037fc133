//! OneDocker workflow definition language (OWDL).
//!
//! A workflow is a chain of named states. Each state launches one container
//! per entry of its `CmdArgsList` from a OneDocker package, then either ends
//! the workflow or names the state that follows it.
//!
//! ```json
//! {
//!   "StartsAt": "Prepare",
//!   "States": {
//!     "Prepare": {
//!       "Type": "Task",
//!       "ContainerDefinition": "mpc-worker:3#worker",
//!       "PackageName": "private_lift/lift",
//!       "CmdArgsList": ["--shard=0", "--shard=1"],
//!       "Next": "Compute"
//!     },
//!     "Compute": { "...": "...", "End": true }
//!   }
//! }
//! ```

mod error;
mod state;
mod workflow;

pub use error::OwdlParseError;
pub use state::OwdlState;
pub use workflow::OwdlWorkflow;
