pub mod builder;
pub mod fees;
pub mod payment;

pub use builder::TransactionBuilder;
pub use payment::PaymentOutput;
