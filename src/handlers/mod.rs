pub mod countries;
pub mod health;
pub mod labels;
