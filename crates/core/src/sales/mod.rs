//! Sales: quotes, orders, invoices, shipments, returns, and commissions.

pub mod commission;
pub mod invoice;
pub mod order;
pub mod quote;
pub mod sales_return;
pub mod shipment;

pub use commission::{CommissionRule, CommissionRuleInput, evaluate as evaluate_commission};
pub use invoice::{InvoiceStatus, SalesInvoice, SalesInvoiceInput};
pub use order::{OrderStatus, SalesOrder, SalesOrderInput};
pub use quote::{QuoteStatus, SalesQuote, SalesQuoteInput};
pub use sales_return::{ReturnStatus, SalesReturn, SalesReturnInput};
pub use shipment::{Shipment, ShipmentInput, ShipmentStatus};
