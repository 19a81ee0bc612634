//! HR: employees, leave, social security, and payroll.

pub mod employee;
pub mod leave;
pub mod payroll;
pub mod social_security;

pub use employee::{Employee, EmployeeInput, EmployeeStatus};
pub use leave::{
    LeaveAllocation, LeaveAllocationInput, LeaveRequest, LeaveRequestInput, LeaveStatus, LeaveType,
    LeaveTypeInput,
};
pub use payroll::{
    Payroll, PayrollEntry, PayrollEntryDetail, PayrollInput, PayrollLineKind, PayrollStatus, calculate_entry,
};
pub use social_security::{Contribution, SocialSecurityRate, SocialSecurityRateInput, effective_rate};
