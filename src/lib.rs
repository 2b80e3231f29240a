pub mod allocation;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod state;
pub mod store;
pub mod types;
pub mod view;

// re-export key types
pub use allocation::allocate;
pub use config::LoanTerms;
pub use decimal::{Money, Rate};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::{LoanLedger, PaymentReceipt, PaymentRequest};
pub use state::{Loan, LoanPayment};
pub use store::{LoanStore, MemoryStore};
pub use types::{LoanId, LoanStatus, PaymentId, PaymentSplit};
pub use view::LoanView;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
