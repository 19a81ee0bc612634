//! Procurement: supplier quotes, purchase orders, goods receipts, and bills.

pub mod goods_receipt;
pub mod purchase_order;
pub mod purchase_quote;
pub mod supplier_bill;

pub use goods_receipt::{GoodsReceipt, GoodsReceiptInput};
pub use purchase_order::{LineReceipt, PurchaseOrder, PurchaseOrderInput, PurchaseOrderStatus};
pub use purchase_quote::{PurchaseQuote, PurchaseQuoteInput, PurchaseQuoteStatus};
pub use supplier_bill::{BillStatus, SupplierBill, SupplierBillInput};
