pub mod address;
pub mod changes;
pub mod derived;
pub mod fields;
pub mod financial;
pub mod investment;
pub mod listing;
