pub mod mongodb;
pub mod schemas;
