//! DOCX format tests
//!
//! Export assertions read the produced parts back; import assertions build packages from
//! hand-written WordprocessingML.

mod export;
mod import;
mod roundtrip;
