pub mod disputedtos;
pub mod offerdtos;
pub mod orderdtos;
pub mod reviewdtos;
