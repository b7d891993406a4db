//! Vyx engine: HTTP submission, cancellation and result storage.
mod cancel;
mod clock;
mod engine;
mod mailbox;
mod submit;

pub use cancel::JobCancel;
pub use clock::TokioClock;
pub use engine::{EngineEvent, EngineHandle};
pub use mailbox::{FileMailbox, Mailbox, MailboxError, MemoryMailbox, RESULT_KEY};
pub use submit::{build_body, ReqwestSubmitter, SubmitError, SubmitSettings, Submitter, WireFields};
