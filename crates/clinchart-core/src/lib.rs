//! Record synchronization engine for clinchart.
//!
//! Keeps an ordered record set, a tabular projection, and a multi-series
//! time plot mutually consistent under insert/edit/delete, and turns one
//! clinical-event form submission into zero or more normalized records.
//!
//! Single-threaded and event-driven: every operation runs to completion
//! on the caller's thread, mutations finish (including the re-sort)
//! before a re-render, and a re-render finishes before selection sync.

pub mod error;
pub mod form;
pub mod schema;
pub mod session;
pub mod store;
pub mod sync;
pub mod temporal;

pub use error::{CoreError, Result};
pub use form::{
    EventForm, FieldInput, FieldOutcome, FieldValue, FormOutcome, check_field, expand_form,
};
pub use schema::{decode_table, encode_table};
pub use session::Session;
pub use store::{CellEdit, RecordStore};
pub use sync::{PlotPoint, PointRef, SelectionUpdate, SeriesData, ViewRanges, ViewSynchronizer};
pub use temporal::{
    CANONICAL_FORMAT, TemporalError, format_timestamp, parse_all, parse_timestamp,
    sort_permutation,
};
