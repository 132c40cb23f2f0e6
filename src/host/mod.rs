//! Collaborators provided by the host system.
//!
//! The batch engine depends on these traits only. `ProcessRegistry` and
//! `ChannelSink` are the local implementations used by the command-line tool.

mod notify;
mod registry;
mod traits;

pub use notify::ChannelSink;
pub use registry::{ProcessRegistry, RegistryListView};
pub use traits::{
    ListMode, NotificationSink, ProcessFilter, ProcessListQuery, ProcessListView, ProcessStore,
    QueryFlags,
};
