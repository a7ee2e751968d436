//! Domain models for the back-office service.

pub mod money;
pub mod payment;
pub mod post;
pub mod staff;
pub mod transaction;

pub use money::Money;
pub use payment::{Payment, PaymentId, PaymentMethod, PaymentMethodId, PaymentStatus};
pub use post::{Post, PostAction, PostId, PostStatus, PostType, PostTypeId};
pub use staff::{Actor, Employee, EmployeeId, Role};
pub use transaction::{
    PaymentTransaction, TransactionId, TransactionKind, net_paid,
};
