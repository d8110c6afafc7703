pub mod api;
pub mod ids;
pub mod match_info;
pub mod result;
pub mod roster;
pub mod substitution;
