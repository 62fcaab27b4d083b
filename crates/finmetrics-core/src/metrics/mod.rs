pub mod budget;
pub mod bundle;
pub mod cost_structure;
pub mod growth;
pub mod margin;
