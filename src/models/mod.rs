pub mod product;
pub mod customer;
pub mod receipt;
