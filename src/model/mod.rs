pub mod billing;
pub mod invoice;
pub mod pay_period;
pub mod role;
pub mod staff;
pub mod user;
