//! Purchase order lifecycle.

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::PurchaseOrderError;
pub use service::PurchaseOrderService;
pub use store::PurchaseOrderStore;
pub use types::{
    CreatePurchaseOrder, PoLineItemLink, PoStatus, PurchaseOrder, PurchaseOrderFilter,
    UpdatePurchaseOrder, derive_values,
};
