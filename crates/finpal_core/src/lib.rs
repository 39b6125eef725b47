//! Pure bookkeeping logic shared by the finpal front-ends.
//!
//! Nothing in this crate performs I/O. Records are fetched by the caller and
//! handed in as plain slices; every function here only looks at its inputs.
pub mod draft;
pub mod mask;
pub mod model;
pub mod period;

pub use draft::{DraftError, NewProjection, NewTransaction, ProjectionDraft, TransactionDraft};
pub use model::{Category, ParseError, Projection, Transaction, TxType};
pub use period::{Direction, Entry, ReferenceMonth, Totals};
