pub mod backend;
pub mod dto;
pub mod poller;
pub mod session;

pub use backend::ImportBackend;
pub use dto::{
    ArchiveUpload, CommitRequest, DiscoverResponse, ImportCandidate, ImportItemStatus, ImportJob,
    ImportResultItem, ImportSelection, JobStatus,
};
pub use poller::PollPolicy;
pub use session::{validate_selections, ImportPhase, ImportSession};
