pub mod cart;
pub mod category;
pub mod flow;
pub mod money;
pub mod order;
pub mod pricing;
pub mod product;
pub mod session;
pub mod settings;
pub mod tracker;
