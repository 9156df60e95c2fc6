//! Typed records for the Congress.gov entities
//!
//! Records are projections of normalized payloads; each keeps its source
//! payload in `raw`. [`ModelResolver`] plugs them into the entity streamer.

mod fetch;
mod fields;
mod records;
mod resolver;

pub use records::{
    Amendment, Bill, BillTextVersion, Committee, CommitteeMeeting, CommitteeRef, Hearing,
    HearingFormat, Member, MemberRole, RelatedLink, Subcommittee,
};
pub use resolver::{ModelResolver, Record};

#[cfg(test)]
mod tests;
